mod soc;

use std::env;
use std::path::Path;

use axi_interconnect::{Package, Topology};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let crossbar = match env::args().nth(1) {
        Some(path) => {
            log::info!("Building interconnect from {}.", path);
            Topology::load(&path)?.build()?.finalize()?
        }
        None => soc::interconnect_2x2()?,
    };

    let mut package = Package::default();
    package.add_crossbar(&crossbar);
    package.add_adapter(&soc::adapter_32_to_128()?, "periph_to_dram");
    package.gen_vir(Path::new("./build"))?;

    Ok(())
}
