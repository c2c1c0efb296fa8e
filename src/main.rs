fn main() -> anyhow::Result<()> {
    ai_compare::cli::run()
}
