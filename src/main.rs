// The library owns every dependency; the binary only boots it.
#![allow(unused_crate_dependencies)]

use sentinel_network::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
