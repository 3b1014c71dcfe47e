/*!
# Stopmap Registry

Reads on-chain token registries: the number of registered items, the
metadata pointer of every item and, optionally, its current owner.

## Features

- **JSON-RPC transport**: `eth_call` against any Ethereum-compatible node
- **ABI codec**: `totalSupply()`, `tokenURI(uint256)`, `ownerOf(uint256)`
- **Multiple registries**: concatenated in declaration order
- **Best-effort traversal**: a failing item is skipped, a failing count aborts
- **Cancellation**: honored at every registry call

## Example

```rust,no_run
use stopmap_registry::{RegistryConfig, RegistryReader};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let reader = RegistryReader::from_configs(&[RegistryConfig::default()])?;
    let listing = reader.list_entries(&CancellationToken::new()).await?;

    for entry in &listing.entries {
        println!("{} -> {}", entry.index, entry.metadata_pointer);
    }

    Ok(())
}
```
*/

pub mod abi;
mod config;
mod error;
mod reader;
mod rpc;

pub use config::{DEFAULT_REGISTRY_ADDRESS, DEFAULT_RPC_URL, RegistryConfig};
pub use error::{RegistryError, Result};
pub use reader::{
    ReadStats, RegistryEntry, RegistryListing, RegistryReader, RegistrySource, TokenRegistry,
};
pub use rpc::JsonRpcRegistry;
