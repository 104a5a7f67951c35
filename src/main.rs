fn main() {
    #[cfg(feature = "cli")]
    vistext::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("vistext: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
