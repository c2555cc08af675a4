pub mod cascade_loader;
pub mod cascade_resolver;
pub mod haar_cascade;
