use cu::pre::*;
use utils::Config;

mod cmd_generate;

#[derive(clap::Parser, AsRef)]
pub struct CmdMain {
    /// TOML config file
    #[clap(short = 'C', long)]
    pub config: String,

    #[clap(subcommand)]
    #[as_ref(cu::cli::Flags)]
    pub cmd: CmdSubcommand,
}

#[derive(clap::Subcommand)]
pub enum CmdSubcommand {
    Generate(CmdGenerate),
}

impl AsRef<cu::cli::Flags> for CmdSubcommand {
    fn as_ref(&self) -> &cu::cli::Flags {
        match self {
            Self::Generate(cmd) => cmd.as_ref(),
        }
    }
}

pub fn main(args: CmdMain) -> cu::Result<()> {
    let config = Config::load(&args.config)?;

    match args.cmd {
        CmdSubcommand::Generate(_) => cmd_generate::run(config),
    }
}

/// Parse the configured headers, run the modifier pipeline, and emit the C
/// header, C++ thunk source, and JSON metadata (spec §5, §6).
#[derive(Debug, clap::Parser, AsRef)]
pub struct CmdGenerate {
    #[clap(flatten)]
    #[as_ref]
    pub common: cu::cli::Flags,
}
