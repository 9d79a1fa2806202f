//! Verilog IR.

use crate::utils::indent;

const INDENT: usize = 4;

/// Module.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Module {
    /// Module name.
    pub name: String,

    /// Port declarations.
    pub port_decls: Vec<PortDeclaration>,

    /// Module items.
    pub module_items: Vec<ModuleItem>,
}

impl ToString for Module {
    fn to_string(&self) -> String {
        format!(
            "`timescale 1ns / 1ps\n\nmodule {}\n(\n{}\n);\n\ngenerate\n{}\nendgenerate\nendmodule",
            self.name,
            indent(
                self.port_decls.iter().map(|port_decl| port_decl.to_string()).collect::<Vec<_>>().join(",\n"),
                INDENT
            ),
            gen_verilog_module(&self.module_items)
        )
    }
}

/// Module item.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ModuleItem {
    /// Module instantiation.
    ModuleInstantiation(ModuleInstantiation),

    /// Comment. (Comment before modules, comment after modules, modules)
    Commented(String, Option<String>, Vec<ModuleItem>),
}

impl ToString for ModuleItem {
    fn to_string(&self) -> String {
        match self {
            ModuleItem::ModuleInstantiation(module_inst) => module_inst.to_string(),
            ModuleItem::Commented(comment_before, comment_after, items) => {
                format!(
                    "/*\n{}\n*/\n{}{}",
                    indent(comment_before.clone(), INDENT),
                    items.iter().map(|item| item.to_string()).collect::<Vec<_>>().join("\n\n"),
                    comment_after.as_ref().map_or("".to_string(), |c| format!("\n/* {} */", c))
                )
            }
        }
    }
}

/// Generates Verilog code for module items.
pub fn gen_verilog_module(module: &[ModuleItem]) -> String {
    module.iter().map(|item| item.to_string()).collect::<Vec<_>>().join("\n\n")
}

/// Port declaration.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum PortDeclaration {
    /// Input declaration.
    Input(usize, String),

    /// Output declaration.
    Output(usize, String),
}

impl ToString for PortDeclaration {
    fn to_string(&self) -> String {
        let (dir, width, ident) = match self {
            Self::Input(width, ident) => ("input", width, ident),
            Self::Output(width, ident) => ("output", width, ident),
        };
        if *width > 1 {
            format!("{} wire [{}-1:0] {}", dir, width, ident)
        } else {
            format!("{} wire {}", dir, ident)
        }
    }
}

impl PortDeclaration {
    /// Creates new input port declaration.
    pub fn input(width: usize, ident: String) -> Self { Self::Input(width, ident) }

    /// Creates new output port declaration.
    pub fn output(width: usize, ident: String) -> Self { Self::Output(width, ident) }

    /// Identifier.
    pub fn ident(&self) -> &str {
        match self {
            Self::Input(_, ident) | Self::Output(_, ident) => ident,
        }
    }
}

/// Module instantiation.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ModuleInstantiation {
    /// Module name.
    pub module_name: String,

    /// Inst name.
    pub inst_name: String,

    /// Params.
    pub params: Vec<(String, Expression)>,

    /// Port connections. `None` leaves the port unconnected.
    pub port_connections: Vec<(String, Option<Expression>)>,
}

impl ToString for ModuleInstantiation {
    fn to_string(&self) -> String {
        format!(
            "{} #(\n{}\n)\n{} (\n{}\n);",
            self.module_name,
            self.params
                .iter()
                .map(|(name, value)| { format!("    .{}({})", name, value.to_string()) })
                .collect::<Vec<_>>()
                .join(",\n"),
            self.inst_name,
            self.port_connections
                .iter()
                .map(|(port_name, expr)| {
                    format!("    .{}({})", port_name, expr.as_ref().map_or("".to_string(), |expr| expr.to_string()))
                })
                .collect::<Vec<_>>()
                .join(",\n")
        )
    }
}

impl ModuleInstantiation {
    /// Creates new module instantiation.
    pub fn new(
        module_name: String, inst_name: String, params: Vec<(String, Expression)>,
        port_connections: Vec<(String, Option<Expression>)>,
    ) -> Self {
        Self { module_name, inst_name, params, port_connections }
    }
}

/// Expression.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Expression {
    /// Primary.
    Primary(Primary),
}

/// Primary.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Primary {
    /// Number.
    Number(String),

    /// Hierarchical identifier.
    HierarchicalIdentifier(String),

    /// Concatenation.
    Concatenation(Concatenation),
}

/// Concatenation.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Concatenation {
    /// Expressions, most significant first.
    pub exprs: Vec<Expression>,
}

impl ToString for Expression {
    fn to_string(&self) -> String {
        match self {
            Self::Primary(prim) => prim.to_string(),
        }
    }
}

impl Expression {
    /// Number.
    pub fn number(num: String) -> Self { Self::Primary(Primary::Number(num)) }

    /// Unsized decimal number.
    pub fn decimal<T: ToString>(num: T) -> Self { Self::number(num.to_string()) }

    /// Sized zero.
    pub fn zero(width: usize) -> Self { Self::number(format!("{}'d0", width)) }

    /// Identifier.
    pub fn ident(ident: String) -> Self { Self::Primary(Primary::HierarchicalIdentifier(ident)) }

    /// Concatenation of the given expressions, most significant first.
    ///
    /// A single expression is returned as is.
    pub fn concat(mut exprs: Vec<Expression>) -> Self {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Self::Primary(Primary::Concatenation(Concatenation { exprs }))
        }
    }
}

impl ToString for Primary {
    fn to_string(&self) -> String {
        match self {
            Self::Number(num) => num.clone(),
            Self::HierarchicalIdentifier(ident) => ident.clone(),
            Self::Concatenation(concat) => concat.to_string(),
        }
    }
}

impl ToString for Concatenation {
    fn to_string(&self) -> String {
        format!("{{{}}}", self.exprs.iter().map(|expr| expr.to_string()).collect::<Vec<_>>().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_declarations() {
        assert_eq!(PortDeclaration::input(32, "cpu_awaddr".to_string()).to_string(), "input wire [32-1:0] cpu_awaddr");
        assert_eq!(PortDeclaration::output(1, "cpu_awready".to_string()).to_string(), "output wire cpu_awready");
    }

    #[test]
    fn expressions() {
        let ident = |name: &str| Expression::ident(name.to_string());
        let concat = Expression::concat(vec![ident("b_awid"), ident("a_awid")]);
        assert!(matches!(&concat, Expression::Primary(Primary::Concatenation(c)) if c.exprs.len() == 2));
        assert_eq!(concat.to_string(), "{b_awid, a_awid}");
        assert_eq!(Expression::concat(vec![ident("a_awid")]), ident("a_awid"));
        assert_eq!(Expression::zero(4).to_string(), "4'd0");
    }

    #[test]
    fn instantiation() {
        let inst = ModuleInstantiation::new(
            "axi_interconnect".to_string(),
            "xbar".to_string(),
            vec![("S_COUNT".to_string(), Expression::decimal(2))],
            vec![
                ("clk".to_string(), Some(Expression::ident("sys_clk".to_string()))),
                ("s_axi_buser".to_string(), None),
            ],
        );
        assert_eq!(
            inst.to_string(),
            "axi_interconnect #(\n    .S_COUNT(2)\n)\nxbar (\n    .clk(sys_clk),\n    .s_axi_buser()\n);"
        );
    }

    #[test]
    fn module() {
        let module = Module {
            name: "top".to_string(),
            port_decls: vec![PortDeclaration::input(1, "clk".to_string())],
            module_items: vec![ModuleItem::Commented("Crossbar.".to_string(), None, vec![])],
        };
        assert_eq!(
            module.to_string(),
            "`timescale 1ns / 1ps\n\nmodule top\n(\n    input wire clk\n);\n\n\
             generate\n/*\n    Crossbar.\n*/\n\nendgenerate\nendmodule"
        );
    }
}
