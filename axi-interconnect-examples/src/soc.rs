use axi_interconnect::*;

pub const ADDRESS_WIDTH: usize = 32;
pub const DATA_WIDTH: usize = 32;
pub const ID_WIDTH: usize = 1;

fn axi(prefix: &str, data_width: usize) -> BusInterface {
    BusInterface::new(prefix, &AxiParams {
        clock_domain: "sys".to_string(),
        address_width: ADDRESS_WIDTH,
        data_width,
        id_width: ID_WIDTH,
    })
}

/// 2x2 interconnect: `cpu` and `dma` share `ram` at 0x0000_0000 and `periph` at 0x1000_0000.
pub fn interconnect_2x2() -> Result<CrossbarConfig, InterconnectError> {
    Interconnect::wrap_with_config(
        InterconnectConfig { module_name: "soc_interconnect".to_string(), ..InterconnectConfig::default() },
        [axi("cpu", DATA_WIDTH), axi("dma", DATA_WIDTH)],
        [
            (Region::new(0x0000_0000, 0x1000_0000), axi("ram", DATA_WIDTH)),
            (Region::new(0x1000_0000, 0x1000_0000), axi("periph", DATA_WIDTH)),
        ],
    )
}

/// Adapter from the 32-bit `periph` bus to a 128-bit `dram` bus.
pub fn adapter_32_to_128() -> Result<AdapterConfig, AdapterError> {
    AdapterConfig::new(&axi("periph", DATA_WIDTH), &axi("dram", 128), AdapterOptions::default())
}
