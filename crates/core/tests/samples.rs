//! Sample-based integration tests — run realistic labels end to end
//! through parse, validate, and execute.

use zpl_preview_core::{Element, execute, parse, to_pretty_json, validate_source};

/// A shipping-style label exercising text, shapes, barcodes, and graphics.
const SHIPPING_LABEL: &str = concat!(
    "^XA",
    "^PW812^LL1218^LH0,0",
    "^CF0,40",
    "^FO30,30^FDACME SHIPPING^FS",
    "^FO30,80^GB752,3,3^FS",
    "^CF0,28",
    "^FO30,110^FDShip to:^FS",
    "^FO30,145^A0N,32,0^FDJane Doe^FS",
    "^FO30,185^FD500 Main Street^FS",
    "^FO30,225^FDSpringfield, OR 97477^FS",
    "^FO30,280^GB350,200,2,B,1^FS",
    "^BY3,2.5,90",
    "^FO60,520^BCN,90,Y,N^FD0123456789^FS",
    "^FO450,300^BQN,2,4^FDQA,https://example.com/track/0123456789^FS",
    "^FO30,700^A0N,24,0^FR^FDPRIORITY^FS",
    "^XZ",
);

#[test]
fn shipping_label_is_valid() {
    let vr = validate_source(SHIPPING_LABEL);
    assert!(vr.ok, "lint failed: {:?}", vr.messages());
}

#[test]
fn shipping_label_parses_with_attributes() {
    let res = parse(SHIPPING_LABEL);
    assert!(res.diagnostics.is_empty(), "{:?}", res.diagnostics);
    assert_eq!(res.label.print_width, Some(812));
    assert_eq!(res.label.print_length, Some(1218));
}

#[test]
fn shipping_label_emits_the_expected_elements() {
    let exec = execute(&parse(SHIPPING_LABEL).label);
    assert!(exec.warnings.is_empty(), "{:?}", exec.warnings);

    let texts = exec
        .elements
        .iter()
        .filter(|e| matches!(e, Element::Text(_)))
        .count();
    let boxes = exec
        .elements
        .iter()
        .filter(|e| matches!(e, Element::Box(_)))
        .count();
    let barcodes = exec
        .elements
        .iter()
        .filter(|e| matches!(e, Element::Barcode(_)))
        .count();
    assert_eq!(texts, 6);
    assert_eq!(boxes, 2);
    assert_eq!(barcodes, 2);
}

#[test]
fn parse_product_serializes_to_json() {
    let res = parse(SHIPPING_LABEL);
    let json = to_pretty_json(&res.label).expect("label serializes");
    assert!(json.contains("\"FieldData\""));
    assert!(json.contains("\"print_width\""));
}

#[test]
fn degenerate_inputs_do_not_panic() {
    for src in [
        "",
        "^",
        "~",
        "^XA",
        "^XZ",
        "^XA^XZ",
        "^FD",
        "^FDunclosed",
        "^GFA,,,,",
        "~DG,,,",
        "^GFA,999999,999999,0,FF",
        "^A",
        "^A0N,,^FD^FS",
        "plain text with no commands",
        "^XA^BQ^FD^FS^XZ",
    ] {
        let res = parse(src);
        let _ = execute(&res.label);
        let _ = validate_source(src);
    }
}

#[test]
fn idempotent_parse_and_execute() {
    let a = execute(&parse(SHIPPING_LABEL).label);
    let b = execute(&parse(SHIPPING_LABEL).label);
    assert_eq!(a.elements, b.elements);
}
