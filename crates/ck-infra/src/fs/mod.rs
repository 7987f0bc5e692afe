pub mod blob_side_store;
