fn main() {
    #[cfg(feature = "cli")]
    streamflate::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("streamflate: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
