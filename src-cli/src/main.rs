fn main() -> anyhow::Result<()> {
    audiohub_cli_lib::run()
}
