mod cmds;

fn main() -> cu::Result<()> {
    let args = <cmds::CmdMain as clap::Parser>::parse();
    cu::cli::init(&args)?;
    cmds::main(args)
}
