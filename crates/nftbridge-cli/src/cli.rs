use std::path::PathBuf;

use alloy_primitives::{Address, TxHash, U256};
use clap::{Parser, Subcommand, ValueEnum};
use nftbridge::{ChainId, TokenStandard};

#[derive(Parser)]
#[command(about = "NFT bridge operator cli", author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"))]
pub struct CLIArgs {
    #[arg(
        short,
        long,
        help = "Use the <directory> as the location of the database",
        required = false
    )]
    pub work_dir: Option<PathBuf>,
    #[arg(
        short,
        long,
        help = "Use the <file name> as the location of the config file",
        required = false
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured routes
    Routes {
        /// Only routes leaving this chain
        #[arg(long)]
        src: Option<ChainId>,
    },
    /// Show the vaults of a chain pair
    Vaults {
        #[arg(long)]
        src: ChainId,
        #[arg(long)]
        dest: ChainId,
    },
    /// Explorer link of a transaction
    Explorer {
        #[arg(long)]
        chain: ChainId,
        #[arg(long)]
        hash: TxHash,
    },
    /// Local bridge history of an address
    History {
        #[arg(long)]
        address: Address,
    },
    /// Run the whole workflow against fake collaborators
    Simulate {
        /// Wallet owning the NFT
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        src: ChainId,
        #[arg(long)]
        dest: ChainId,
        /// NFT contract on the source chain
        #[arg(long)]
        contract: Address,
        #[arg(long)]
        token_id: U256,
        #[arg(long, value_enum, default_value_t = NftStandard::Erc721)]
        standard: NftStandard,
        #[arg(long, default_value = "0")]
        fee: U256,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NftStandard {
    Erc721,
    Erc1155,
}

impl From<NftStandard> for TokenStandard {
    fn from(standard: NftStandard) -> Self {
        match standard {
            NftStandard::Erc721 => TokenStandard::Erc721,
            NftStandard::Erc1155 => TokenStandard::Erc1155,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        CLIArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_vaults() {
        let args = CLIArgs::parse_from(["nftbridge-cli", "vaults", "--src", "1", "--dest", "10"]);

        assert!(matches!(args.command, Commands::Vaults { src: 1, dest: 10 }));
    }
}
