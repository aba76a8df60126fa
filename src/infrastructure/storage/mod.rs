mod azure_store;
mod local_store;
mod memory_store;
mod object_store_ops;
mod store_factory;

pub use azure_store::AzureObjectStorage;
pub use local_store::LocalObjectStorage;
pub use memory_store::InMemoryObjectStorage;
pub use store_factory::ObjectStorageFactory;
