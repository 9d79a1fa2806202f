//! Generates Verilog code.
//!
//! The generated wrapper exposes the signals of every registered interface as its own ports and
//! instantiates the external module with the packed vectors, so it can be dropped into a design
//! that names its buses after the interfaces' prefixes.

use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::region::PackedParams;
use crate::vir::*;
use crate::*;

const USER_CHANNELS: [&str; 5] = ["AW", "W", "B", "AR", "R"];

impl Package {
    fn gen_vir_module<P: AsRef<Path>>(&self, module: &vir::Module, path_dir: P) -> Result<(), PackageError> {
        let path = path_dir.as_ref().join(format!("{}.v", module.name));
        let mut file = File::create(path).map_err(|error| PackageError::Fs { error })?;

        writeln!(file, "{}", module.to_string()).map_err(|error| PackageError::Fs { error })?;

        Ok(())
    }

    /// Generates Verilog code at the given directory path.
    pub fn gen_vir<P: AsRef<Path>>(self, path_dir: P) -> Result<(), PackageError> {
        let mut names = HashSet::new();
        for module in self.modules.iter() {
            if !names.insert(module.name.as_str()) {
                return Err(PackageError::DuplicateModule { name: module.name.clone() });
            }
        }

        fs::create_dir_all(path_dir.as_ref()).map_err(|error| PackageError::Fs { error })?;

        for module in self.modules.iter() {
            log::info!("Writing {}.v.", module.name);
            self.gen_vir_module(module, &path_dir)?;
        }

        Ok(())
    }
}

/// Generates the wrapper module of a crossbar.
pub fn gen_crossbar(config: &CrossbarConfig) -> vir::Module {
    let mut params = vec![
        ("S_COUNT".to_string(), Expression::decimal(config.slave_count)),
        ("M_COUNT".to_string(), Expression::decimal(config.master_count)),
        ("DATA_WIDTH".to_string(), Expression::decimal(config.data_width)),
        ("ADDR_WIDTH".to_string(), Expression::decimal(config.address_width)),
        ("ID_WIDTH".to_string(), Expression::decimal(config.id_width)),
    ];
    params.extend(gen_user_params());
    params.push(("M_BASE_ADDR".to_string(), gen_packed_param(&config.base_addresses)));
    params.push(("M_ADDR_WIDTH".to_string(), gen_packed_param(&config.region_widths)));

    let channels = [&config.packed_slave_channels, &config.packed_master_channels];
    let inst = ModuleInstantiation::new(
        Abi::Interconnect.module_name().to_string(),
        config.inst_name.clone(),
        params,
        gen_port_connections(&config.clock_domain, channels),
    );

    let comment = format!(
        "{}x{} AXI interconnect.\nregister: {}, timeout_cycles: {}.",
        config.slave_count, config.master_count, config.register, config.timeout_cycles
    );

    vir::Module {
        name: config.module_name.clone(),
        port_decls: gen_port_decls(&config.clock_domain, channels),
        module_items: vec![ModuleItem::Commented(comment, None, vec![ModuleItem::ModuleInstantiation(inst)])],
    }
}

/// Generates a wrapper module named `name` around an adapter.
pub fn gen_adapter(config: &AdapterConfig, name: &str) -> vir::Module {
    let mut params = vec![
        ("ADDR_WIDTH".to_string(), Expression::decimal(config.addr_width)),
        ("S_DATA_WIDTH".to_string(), Expression::decimal(config.s_data_width)),
        ("M_DATA_WIDTH".to_string(), Expression::decimal(config.m_data_width)),
        ("FORWARD_ID".to_string(), Expression::decimal(u8::from(config.forward_id))),
        ("ID_WIDTH".to_string(), Expression::decimal(config.id_width)),
    ];
    params.extend(gen_user_params());
    params.push(("CONVERT_BURST".to_string(), Expression::decimal(u8::from(config.convert_burst))));
    params.push(("CONVERT_NARROW_BURST".to_string(), Expression::decimal(u8::from(config.convert_narrow_burst))));

    let channels = [&config.packed_slave_channels, &config.packed_master_channels];
    let inst = ModuleInstantiation::new(
        Abi::Adapter.module_name().to_string(),
        config.inst_name.clone(),
        params,
        gen_port_connections(&config.clock_domain, channels),
    );

    vir::Module {
        name: name.to_string(),
        port_decls: gen_port_decls(&config.clock_domain, channels),
        module_items: vec![ModuleItem::ModuleInstantiation(inst)],
    }
}

fn gen_user_params() -> Vec<(String, Expression)> {
    USER_CHANNELS
        .iter()
        .flat_map(|channel| {
            [
                (format!("{}USER_ENABLE", channel), Expression::decimal(0)),
                (format!("{}USER_WIDTH", channel), Expression::decimal(AXI_USER_WIDTH)),
            ]
        })
        .collect()
}

fn gen_packed_param(params: &PackedParams) -> Expression {
    if params.is_empty() {
        Expression::decimal(0)
    } else {
        Expression::number(params.to_verilog())
    }
}

fn gen_port_decls(clock_domain: &str, channels: [&PackedChannels; 2]) -> Vec<PortDeclaration> {
    let clock = [
        PortDeclaration::input(1, format!("{}_clk", clock_domain)),
        PortDeclaration::input(1, format!("{}_rst", clock_domain)),
    ];
    let signals = channels.into_iter().flat_map(|packed| packed.values()).flat_map(|vector| {
        vector.segments().iter().filter(|segment| segment.width > 0).map(move |segment| match vector.direction {
            Direction::Input => PortDeclaration::input(segment.width, segment.signal.clone()),
            Direction::Output => PortDeclaration::output(segment.width, segment.signal.clone()),
        })
    });

    clock.into_iter().chain(signals).collect()
}

fn gen_port_connections(clock_domain: &str, channels: [&PackedChannels; 2]) -> Vec<(String, Option<Expression>)> {
    let clock = [
        ("clk".to_string(), Some(Expression::ident(format!("{}_clk", clock_domain)))),
        ("rst".to_string(), Some(Expression::ident(format!("{}_rst", clock_domain)))),
    ];
    let vectors = channels
        .into_iter()
        .flat_map(|packed| packed.values())
        .map(|vector| (vector.name(), gen_vector_expr(vector)));

    clock.into_iter().chain(vectors).collect()
}

fn gen_vector_expr(vector: &PackedVector) -> Option<Expression> {
    if vector.width == 0 {
        return None;
    }

    match &vector.packing {
        Packing::Concat(segments) => Some(Expression::concat(
            segments
                .iter()
                .rev()
                .filter(|segment| segment.width > 0)
                .map(|segment| Expression::ident(segment.signal.clone()))
                .collect(),
        )),
        Packing::Zero => Some(Expression::zero(vector.width)),
        Packing::Open => None,
    }
}
