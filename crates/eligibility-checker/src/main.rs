fn main() -> anyhow::Result<()> {
    eligibility_checker::cli::main()
}
