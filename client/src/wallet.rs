//! Wallet-authentication provider seam.
//!
//! The wallet provider (payment custody) is an external collaborator; this
//! trait covers the three operations the flow needs from it.

use crate::error::ClientError;
use yam_types::WalletAddress;

/// The provider's view of the current user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalletUser {
    pub addr: Option<WalletAddress>,
    pub logged_in: bool,
}

impl WalletUser {
    /// The connected address, if any.
    pub fn address(&self) -> Option<&WalletAddress> {
        self.addr.as_ref().filter(|a| !a.is_empty())
    }
}

/// External wallet-authentication provider.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompt the user to connect a wallet.
    async fn authenticate(&self) -> Result<WalletUser, ClientError>;

    /// Disconnect the current wallet.
    async fn unauthenticate(&self) -> Result<(), ClientError>;

    /// The current user without prompting.
    async fn current_user(&self) -> WalletUser;
}
