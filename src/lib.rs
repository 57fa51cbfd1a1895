pub use gamepack_core::*;

pub mod build {
    pub use gamepack_build::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use gamepack_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use gamepack_client::*;
}

#[cfg(feature = "fs")]
pub mod fs {
    pub use gamepack_fs::*;
}

#[cfg(feature = "mock")]
pub mod mock {
    pub use gamepack_mock::*;
}

#[cfg(feature = "s3")]
pub mod s3 {
    pub use gamepack_s3::*;
}

#[cfg(feature = "cloudinary")]
pub mod cloudinary {
    pub use gamepack_cloudinary::*;
}

#[cfg(feature = "postgres")]
pub mod postgres {
    pub use gamepack_postgres::*;
}

pub mod prelude {
    pub use gamepack_build::prelude::*;
    pub use gamepack_core::prelude::*;

    #[cfg(feature = "server")]
    pub use gamepack_server::prelude::*;

    #[cfg(feature = "client")]
    pub use gamepack_client::GamepackClient;

    #[cfg(feature = "fs")]
    pub use gamepack_fs::{FsGameStore, FsSheetStore};

    #[cfg(feature = "mock")]
    pub use gamepack_mock::{MemoryCdn, MemoryGameStore};

    #[cfg(feature = "s3")]
    pub use gamepack_s3::S3SheetStore;

    #[cfg(feature = "cloudinary")]
    pub use gamepack_cloudinary::{CloudinaryConfig, CloudinaryUploader};

    #[cfg(feature = "postgres")]
    pub use gamepack_postgres::PgGameStore;
}
