//! Denodo connector.
//!
//! Two adapters share one catalog tree: [`VdpAdapter`] writes VDP
//! descriptions through VQL over the PostgreSQL wire protocol, and
//! [`LocalCatalogAdapter`] writes the Denodo Data Catalog's local copies
//! over REST. Both render descriptions with the logical name label.

mod local;
mod local_adapter;
pub mod memory;
mod vdp;
mod vdp_adapter;

pub use local::{
    DenodoLocalClient, LocalClientConfig, LocalDatabase, LocalField, LocalViewDetail,
    RICH_TEXT,
};
pub use local_adapter::LocalCatalogAdapter;
pub use vdp::{
    SqlxVdpClient, VdpCatalog, VdpConnectConfig, VdpDatabase, VdpView, VdpViewColumn, VdpViewType,
    alter_column_statement, alter_database_statement, alter_view_statement, escape_literal,
    quote_identifier,
};
pub use vdp_adapter::VdpAdapter;

/// System name of the VDP adapter.
pub const VDP_SYSTEM: &str = "denodo_vdp";

/// System name of the local data catalog adapter.
pub const LOCAL_SYSTEM: &str = "denodo_local";

/// Denodo catalog roots are databases.
pub const CONTAINER_DEPTH: usize = 0;
