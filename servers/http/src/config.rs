use std::{net::IpAddr, path::PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpServerConfig {
    // ip address to serve on
    pub address: IpAddr,
    // port to serve on
    pub port: u16,
    // directory holding the playlist and segment files
    #[serde(skip)]
    pub root: PathBuf,
}
