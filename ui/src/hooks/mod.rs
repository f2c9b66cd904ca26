pub mod use_before_unload;
