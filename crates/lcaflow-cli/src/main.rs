fn main() {
    std::process::exit(lcaflow_cli::cli::run_from_env());
}
