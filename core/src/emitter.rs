//! The Equation Emitter (§4.4) and the ambient output-document rendering
//! of §4.8: constant-pin handling, polarity selection, deterministic
//! sum-of-products formatting, the equations-file header and pin-mappings
//! section, and the optional truth-table document.
//!
//! Rendering is pure string production — no filesystem access happens
//! here. The CLI crate performs the actual write, keeping the one
//! blocking output operation strictly outside the core engine (§5).

use crate::minimizer::{MinimizedForm, Minimizer, Product};
use crate::pin::{Pin, PinModel};
use crate::profile::DeviceProfile;

/// Which polarity (or polarities) to emit for an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Auto,
    Both,
    Positive,
    Negative,
}

impl std::str::FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Polarity::Auto),
            "both" => Ok(Polarity::Both),
            "positive" => Ok(Polarity::Positive),
            "negative" => Ok(Polarity::Negative),
            other => Err(format!(
                "unknown polarity `{other}` (expected auto|both|positive|negative)"
            )),
        }
    }
}

/// Everything the emitter needs beyond the analyzed pin model.
pub struct EmitOptions {
    pub polarity: Polarity,
    pub oe_polarity: Polarity,
    pub input_stem: String,
    pub date: String,
    pub truthtable: bool,
}

/// The rendered output of one run: always the equations document, and the
/// truth-table document when `EmitOptions::truthtable` was set.
pub struct EmittedDocument {
    pub equations: String,
    pub truth_table: Option<String>,
}

/// Render the complete equations document (and, if requested, the
/// truth-table document) for an analyzed pin model.
pub fn emit(
    profile: &DeviceProfile,
    model: &PinModel,
    minimizer: &dyn Minimizer,
    opts: &EmitOptions,
) -> EmittedDocument {
    let mut equation_lines = Vec::new();
    let mut oe_lines = Vec::new();
    let mut truth_table_lines = Vec::new();

    for op in &model.outputs {
        if let Some(line) = render_output_equation(op, minimizer, opts.polarity) {
            equation_lines.push(line);
        }
        if let Some(line) = render_oe_equation(op, minimizer, opts.oe_polarity) {
            oe_lines.push(line);
        }
        if opts.truthtable {
            truth_table_lines.push(render_truth_table_entry(op));
        }
    }

    let mut doc = String::new();
    doc.push_str(&render_header(profile, opts));
    doc.push_str("\n/* Pin mappings */\n");
    doc.push_str(&render_pin_mappings(profile, model));
    doc.push_str("\n/* Output equations */\n");
    for l in &equation_lines {
        doc.push_str(l);
        doc.push('\n');
    }
    doc.push_str("\n/* Output enable equations */\n");
    for l in &oe_lines {
        doc.push_str(l);
        doc.push('\n');
    }

    let truth_table = opts.truthtable.then(|| truth_table_lines.join("\n"));

    EmittedDocument {
        equations: doc,
        truth_table,
    }
}

fn render_header(profile: &DeviceProfile, opts: &EmitOptions) -> String {
    format!(
        "Name     {};\nDevice   {};\nPartno   ;\nRevision ;\nDate     {};\nDesigner ;\nCompany  ;\nAssembly ;\nLocation ;\n",
        opts.input_stem, profile.device_name, opts.date,
    )
}

fn render_pin_mappings(profile: &DeviceProfile, model: &PinModel) -> String {
    let mut pin_numbers: Vec<u32> = profile
        .address_pins
        .iter()
        .chain(profile.data_pins.iter())
        .cloned()
        .collect();
    pin_numbers.sort_unstable();
    pin_numbers.dedup();

    let mut lines = Vec::with_capacity(pin_numbers.len());
    for pin_number in pin_numbers {
        let name = profile.pin_name(pin_number).unwrap_or("?");
        let role = classify_pin(profile, model, pin_number);
        lines.push(format!("pin {pin_number} = {name}; /* {role} */"));
    }
    lines.join("\n")
}

fn classify_pin(profile: &DeviceProfile, model: &PinModel, pin_number: u32) -> String {
    if let Some(op) = model.outputs.iter().find(|o| o.pin_number == pin_number) {
        let base = if op.depends.bitmap() != 0 {
            "Combinatorial output"
        } else if op.seen_high && !op.seen_low {
            "Fixed high output"
        } else if op.seen_low && !op.seen_high {
            "Fixed low output"
        } else {
            "Input"
        };
        if base != "Input" && op.oe_depends.bitmap() != 0 {
            return format!("{base} w/ output enable");
        }
        return base.to_string();
    }

    if profile.address_pins.contains(&pin_number) {
        "Dedicated input".to_string()
    } else {
        "Input".to_string()
    }
}

/// §4.4: constant handling for an empty `depends`, else a minimized
/// equation chosen per `polarity`.
fn render_output_equation(op: &Pin, minimizer: &dyn Minimizer, polarity: Polarity) -> Option<String> {
    if op.depends.bitmap() == 0 {
        return if op.seen_high {
            Some(format!("{} = 'b'1;", op.name))
        } else if op.seen_low {
            Some(format!("{} = 'b'0;", op.name))
        } else {
            None
        };
    }

    let k = op.depends.len() as u32;
    let pos = minimizer.simplify(k, &op.positive_terms, &op.dont_care_terms);
    let neg = minimizer.simplify(k, &op.negative_terms, &op.dont_care_terms);
    let names = op.depends.pinnames();

    Some(render_polarity_choice(&op.name, polarity, &pos, &neg, names))
}

/// §4.4: the OE equation follows the same pattern against `oe_depends`,
/// with no don't-cares, and a trivial-one-dependency-less shortcut when
/// `oe_depends` is empty but the pin was observed active at all.
fn render_oe_equation(op: &Pin, minimizer: &dyn Minimizer, polarity: Polarity) -> Option<String> {
    let lhs = format!("{}.oe", op.name);

    if op.oe_depends.bitmap() == 0 {
        return if op.seen_high || op.seen_low {
            Some(format!("{lhs} = 'b'1;"))
        } else {
            None
        };
    }

    let k = op.oe_depends.len() as u32;
    let empty = std::collections::BTreeSet::new();
    let pos = minimizer.simplify(k, &op.oe_positive_terms, &empty);
    let neg = minimizer.simplify(k, &op.oe_negative_terms, &empty);
    let names = op.oe_depends.pinnames();

    Some(render_polarity_choice(&lhs, polarity, &pos, &neg, names))
}

fn render_polarity_choice(
    lhs: &str,
    polarity: Polarity,
    pos: &MinimizedForm,
    neg: &MinimizedForm,
    names: &[String],
) -> String {
    match polarity {
        Polarity::Positive => render_form(lhs, pos, names),
        Polarity::Negative => render_form(&format!("!{lhs}"), neg, names),
        Polarity::Both => {
            let positive = render_form(lhs, pos, names);
            let negative = render_form(&format!("!{lhs}"), neg, names);
            format!("{positive}\n{negative}")
        }
        Polarity::Auto => {
            if pick_positive(pos, neg) {
                render_form(lhs, pos, names)
            } else {
                render_form(&format!("!{lhs}"), neg, names)
            }
        }
    }
}

/// auto polarity (§4.4, §8 property 5): positive wins on a literal
/// constant, or when its product count is no larger than the negative's.
fn pick_positive(pos: &MinimizedForm, neg: &MinimizedForm) -> bool {
    match (pos, neg) {
        (MinimizedForm::True, _) | (MinimizedForm::False, _) => true,
        (_, MinimizedForm::True) | (_, MinimizedForm::False) => false,
        (MinimizedForm::Products(p), MinimizedForm::Products(n)) => p.len() <= n.len(),
    }
}

fn render_form(lhs: &str, form: &MinimizedForm, names: &[String]) -> String {
    match form {
        MinimizedForm::True => format!("{lhs} = 'b'1;"),
        MinimizedForm::False => format!("{lhs} = 'b'0;"),
        MinimizedForm::Products(products) => {
            let mut sorted = products.clone();
            sorted.sort_by_key(|p| (p.care_mask, p.value_bits));
            render_sum_of_products(lhs, &sorted, names)
        }
    }
}

fn render_sum_of_products(lhs: &str, products: &[Product], names: &[String]) -> String {
    let indent = " ".repeat(lhs.len() + 3);
    let rendered: Vec<String> = products.iter().map(|p| render_product(p, names)).collect();

    let mut out = format!("{lhs} = {}", rendered[0]);
    for line in &rendered[1..] {
        out.push_str(&format!("\n{indent}# {line}"));
    }
    out.push(';');
    out
}

fn render_product(product: &Product, names: &[String]) -> String {
    let mut literals = Vec::new();
    for i in 0..names.len() {
        let bit = 1u32 << i;
        if product.care_mask & bit == 0 {
            continue;
        }
        if product.value_bits & bit != 0 {
            literals.push(names[i].clone());
        } else {
            literals.push(format!("!{}", names[i]));
        }
    }
    if literals.is_empty() {
        "'b'1".to_string()
    } else {
        literals.join(" & ")
    }
}

/// One line per minterm, in the same `&`/`!`/`'b'0`/`'b'1` vocabulary as
/// the equations file: a bare condition means `{name} = 'b'1`, a negated
/// one means `{name} = 'b'0`, and `_DC` lines mark don't-cares.
fn render_truth_table_entry(op: &Pin) -> String {
    let condition = |m: &u32| op.conditions.get(*m as usize).cloned().unwrap_or_default();

    let mut lines: Vec<String> = Vec::new();
    for m in &op.positive_terms {
        lines.push(format!("{} = 'b'1;  /* {} */", op.name, condition(m)));
    }
    for m in &op.negative_terms {
        lines.push(format!("{} = 'b'0;  /* {} */", op.name, condition(m)));
    }
    for m in &op.dont_care_terms {
        lines.push(format!("{}_DC;  /* {} */", op.name, condition(m)));
    }
    lines.join("\n")
}
