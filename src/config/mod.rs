mod server;

pub use server::{
    AuthConfig, CONFIG_FILE_NAME, DB_FILE_NAME, FileConfig, SECRET_FILE_NAME, ServerConfig,
    decode_secret, generate_secret,
};
