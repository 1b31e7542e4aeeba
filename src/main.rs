fn main() {
    if let Err(err) = repohealth::cli::run() {
        repohealth::ui::eprintln_error(&err);
        std::process::exit(repohealth::exit::exit_code(&err));
    }
}
