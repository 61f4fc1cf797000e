// Library root
// -----------
// `ghrepo` reads and writes files in a hosted repository through its
// contents API. The binary (`main.rs`) only parses arguments and maps
// errors to exit codes; everything else lives here.
//
// Module responsibilities:
// - `error`: closed error taxonomy and the HTTP/transport classifier.
// - `api`: authenticated blocking HTTP gateway (`ContentsApi`, `ApiClient`).
// - `service`: content resolver; stat, list, read, download, write, delete.
// - `transfer`: local filesystem writes for downloads.
// - `model`, `repo`, `config`: plain data shared by the layers above.
// - `output`, `ui`, `commands`: the command surface.
pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod repo;
pub mod service;
pub mod transfer;
pub mod ui;
