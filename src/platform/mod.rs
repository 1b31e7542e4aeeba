use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

pub const TOKEN_ENV_VARS: [&str; 2] = ["REPOHEALTH_TOKEN", "GITHUB_TOKEN"];

pub fn effective_home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("HOME is not set"))
}

/// First non-empty token from the environment, in `TOKEN_ENV_VARS` order.
pub fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Asks for the token on the terminal. Returns `None` on empty input.
pub fn prompt_token() -> Result<Option<String>> {
    let answer = prompt_line("Enter your GitHub token: ")?;
    Ok(Some(answer).filter(|a| !a.is_empty()))
}

fn prompt_line(prompt: &str) -> Result<String> {
    {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(prompt.as_bytes())
            .context("failed to write prompt")?;
        stdout.flush().context("failed to flush stdout")?;
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}
