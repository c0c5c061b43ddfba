fn main() {
    #[cfg(feature = "cli")]
    bsontree::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("bsontree: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
