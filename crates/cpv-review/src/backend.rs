//! The controller's view of the checkplot server.

use std::future::Future;

use cpv_client::{CheckplotClient, ClientError, SaveReceipt};
use cpv_core::Checkplot;

/// Fetch and update operations the controller drives.
///
/// Implemented by [`CheckplotClient`] for real servers; tests substitute a
/// recording fake.
pub trait Backend {
    fn fetch(&self, identifier: &str) -> impl Future<Output = Result<Checkplot, ClientError>>;

    fn save(
        &self,
        identifier: &str,
        checkplot: &Checkplot,
    ) -> impl Future<Output = Result<SaveReceipt, ClientError>>;
}

impl Backend for CheckplotClient {
    async fn fetch(&self, identifier: &str) -> Result<Checkplot, ClientError> {
        Self::fetch(self, identifier).await
    }

    async fn save(&self, identifier: &str, checkplot: &Checkplot) -> Result<SaveReceipt, ClientError> {
        Self::save(self, identifier, checkplot).await
    }
}
