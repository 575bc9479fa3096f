fn main() -> anyhow::Result<()> {
    easylod_cli::run()
}
