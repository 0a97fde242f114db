use weightlog::Cli;

fn main() {
    env_logger::init();

    if let Err(err) = Cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
