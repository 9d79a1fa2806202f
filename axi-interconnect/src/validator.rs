//! Consistency validator.
//!
//! A crossbar instantiated by plain signal concatenation needs every port to share the clock
//! domain, the address width and the data width. The validator checks these properties over an
//! ordered sequence of ports and derives the global parameters from the first one.

use std::fmt;

use crate::*;

/// Global parameters shared by every port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalParameters {
    /// Clock domain.
    pub clock_domain: String,

    /// Address width in bits.
    pub address_width: usize,

    /// Data width in bits.
    pub data_width: usize,

    /// ID width in bits, taken from the first port.
    pub id_width: usize,
}

/// Properties compared across ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Clock domain.
    ClockDomain,

    /// Width of `awaddr`.
    AddressWidth,

    /// Width of `wdata`.
    DataWidth,

    /// Width of `awid`.
    IdWidth,
}

impl Property {
    /// Properties that must always be uniform, in checking order.
    pub const UNIFORM: [Property; 3] = [Property::ClockDomain, Property::AddressWidth, Property::DataWidth];

    /// Value of the property on the given interface.
    pub fn value(self, interface: &BusInterface) -> String {
        match self {
            Property::ClockDomain => interface.clock_domain().to_string(),
            Property::AddressWidth => interface.address_width().to_string(),
            Property::DataWidth => interface.data_width().to_string(),
            Property::IdWidth => interface.id_width().to_string(),
        }
    }

    /// Identifier of the property (e.g. `clock_domain`).
    pub fn name(self) -> &'static str {
        match self {
            Property::ClockDomain => "clock_domain",
            Property::AddressWidth => "address_width",
            Property::DataWidth => "data_width",
            Property::IdWidth => "id_width",
        }
    }

    /// Human-readable name used in log records (e.g. `Clock Domain`).
    pub(crate) fn label(self) -> &'static str {
        match self {
            Property::ClockDomain => "Clock Domain",
            Property::AddressWidth => "Address Width",
            Property::DataWidth => "Data Width",
            Property::IdWidth => "ID Width",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name()) }
}

/// Consistency validator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyValidator {
    /// Also require a uniform ID width.
    ///
    /// Off by default: the ID width is then taken from the first port and a disagreement is only
    /// logged.
    pub strict_id_width: bool,
}

impl ConsistencyValidator {
    /// Checks the given ports (name and interface, slaves first) and returns the global parameters.
    ///
    /// When `show` is set, the derived parameters are logged.
    pub fn check<'a, I>(&self, ports: I, show: bool) -> Result<GlobalParameters, InterconnectError>
    where I: IntoIterator<Item = (&'a str, &'a BusInterface)> {
        let ports = ports.into_iter().collect::<Vec<_>>();
        let (reference_port, reference) = *ports.first().ok_or(InterconnectError::EmptyRegistry)?;

        for property in Property::UNIFORM {
            check_property(property, &ports)?;
            if show {
                log::info!("{}: {}", property.label(), property.value(reference));
            }
        }

        let id_width = reference.id_width();
        if self.strict_id_width {
            check_property(Property::IdWidth, &ports)?;
        } else if let Some((name, interface)) = ports.iter().find(|(_, interface)| interface.id_width() != id_width) {
            log::warn!(
                "Different ID Width on AXI interfaces ({}: {} / {}: {}), using {}.",
                reference_port,
                id_width,
                name,
                interface.id_width(),
                id_width
            );
        }
        if show {
            log::info!("{}: {}", Property::IdWidth.label(), id_width);
        }

        Ok(GlobalParameters {
            clock_domain: reference.clock_domain().to_string(),
            address_width: reference.address_width(),
            data_width: reference.data_width(),
            id_width,
        })
    }
}

fn check_property(property: Property, ports: &[(&str, &BusInterface)]) -> Result<(), InterconnectError> {
    let (reference_port, reference) = ports[0];
    let expected = property.value(reference);

    for (name, interface) in &ports[1..] {
        let actual = property.value(interface);
        if actual != expected {
            log::error!(
                "Different {} on AXI interfaces ({}: {} / {}: {}), should be the same.",
                property.label(),
                reference_port,
                expected,
                name,
                actual
            );
            return Err(InterconnectError::Consistency {
                property,
                reference_port: reference_port.to_string(),
                offending_port: name.to_string(),
                expected,
                actual,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axi(clock_domain: &str, address_width: usize, data_width: usize, id_width: usize) -> BusInterface {
        let clock_domain = clock_domain.to_string();
        BusInterface::new("p", &AxiParams { clock_domain, address_width, data_width, id_width })
    }

    #[test]
    fn empty() {
        let validator = ConsistencyValidator::default();
        assert_eq!(validator.check(Vec::new(), true), Err(InterconnectError::EmptyRegistry));
    }

    #[test]
    fn uniform() {
        let a = axi("sys", 32, 64, 4);
        let b = axi("sys", 32, 64, 4);
        let params = ConsistencyValidator::default().check(vec![("a", &a), ("b", &b)], true).unwrap();

        assert_eq!(params, GlobalParameters {
            clock_domain: "sys".to_string(),
            address_width: 32,
            data_width: 64,
            id_width: 4
        });
    }

    #[test]
    fn clock_domain_mismatch() {
        let a = axi("sys", 32, 32, 1);
        let b = axi("sys", 32, 32, 1);
        let c = axi("pix", 32, 32, 1);
        let err = ConsistencyValidator::default().check(vec![("a", &a), ("b", &b), ("c", &c)], false).unwrap_err();

        assert_eq!(err, InterconnectError::Consistency {
            property: Property::ClockDomain,
            reference_port: "a".to_string(),
            offending_port: "c".to_string(),
            expected: "sys".to_string(),
            actual: "pix".to_string(),
        });
    }

    #[test]
    fn properties_are_checked_in_order() {
        let a = axi("sys", 32, 32, 1);
        let b = axi("sys", 64, 32, 1);
        let c = axi("pix", 32, 32, 1);
        let err = ConsistencyValidator::default().check(vec![("a", &a), ("b", &b), ("c", &c)], false).unwrap_err();

        // `c` has the wrong clock domain, which is checked before `b`'s address width.
        assert!(matches!(err, InterconnectError::Consistency { property: Property::ClockDomain, .. }));
    }

    #[test]
    fn width_mismatch() {
        let a = axi("sys", 32, 32, 1);
        let b = axi("sys", 40, 32, 1);
        let c = axi("sys", 32, 64, 1);
        let validator = ConsistencyValidator::default();

        let err = validator.check(vec![("a", &a), ("b", &b)], false).unwrap_err();
        assert!(matches!(err, InterconnectError::Consistency { property: Property::AddressWidth, .. }));

        let err = validator.check(vec![("a", &a), ("c", &c)], false).unwrap_err();
        assert!(matches!(err, InterconnectError::Consistency { property: Property::DataWidth, .. }));
    }

    #[test]
    fn id_width_from_first_port() {
        let a = axi("sys", 32, 32, 2);
        let b = axi("sys", 32, 32, 8);

        let params = ConsistencyValidator::default().check(vec![("a", &a), ("b", &b)], false).unwrap();
        assert_eq!(params.id_width, 2);

        let params = ConsistencyValidator::default().check(vec![("b", &b), ("a", &a)], false).unwrap();
        assert_eq!(params.id_width, 8);
    }

    #[test]
    fn labels() {
        assert_eq!(Property::ClockDomain.label(), "Clock Domain");
        assert_eq!(Property::IdWidth.label(), "ID Width");
        assert_eq!(Property::IdWidth.to_string(), "id_width");
    }

    #[test]
    fn strict_id_width() {
        let a = axi("sys", 32, 32, 2);
        let b = axi("sys", 32, 32, 8);
        let validator = ConsistencyValidator { strict_id_width: true };

        let err = validator.check(vec![("a", &a), ("b", &b)], false).unwrap_err();
        assert!(matches!(err, InterconnectError::Consistency { property: Property::IdWidth, .. }));
        assert_eq!(err.to_string(), "different id_width on AXI interfaces (a: 2 / b: 8), should be the same");
    }
}
