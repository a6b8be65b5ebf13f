pub mod api;
pub mod jsonrpc;
pub mod stdio;
pub mod types;

pub use api::{HostHandle, NullHost};
pub use stdio::serve;
pub use types::{
    ActionCommand, DeepLink, ItemAction, ItemIcon, ItemPreview, ListItem, PluginQuery,
};
