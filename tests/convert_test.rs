//! End-to-end SVG to VectorDrawable conversions.

use svg2drawable::{
    Color, ConvertError, Fill, SvgElement, convert_svg, parse_svg, validate_document,
};

#[test]
fn test_solid_red_circle() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24">
        <circle cx="12" cy="12" r="10" fill="red"/>
    </svg>"#;

    let xml = convert_svg(svg, false).unwrap();
    assert!(xml.contains(r#"android:width="24dp""#));
    assert!(xml.contains(r#"android:height="24dp""#));
    assert!(xml.contains(r#"android:viewportWidth="24""#));
    assert!(xml.contains(r#"android:viewportHeight="24""#));
    assert!(xml.contains(r##"android:fillColor="#FF0000""##));
    assert!(xml.contains(r#"android:pathData="M2,12 a10,10 0 1,0 20,0 a10,10 0 1,0 -20,0 Z""#));
    assert!(!xml.contains("xmlns:aapt"));
    assert_eq!(xml.matches("<path").count(), 1);
}

#[test]
fn test_two_stop_linear_gradient() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 24 24">
        <defs>
            <linearGradient id="fade" gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="24" y2="24">
                <stop offset="0" stop-color="#00ff00"/>
                <stop offset="1" stop-color="#0000ff" stop-opacity=".5"/>
            </linearGradient>
        </defs>
        <path d="M0 0h24v24H0z" fill="url(#fade)"/>
    </svg>"##;

    let xml = convert_svg(svg, false).unwrap();
    assert!(xml.contains(r#"xmlns:aapt="http://schemas.android.com/aapt""#));
    assert_eq!(xml.matches("<gradient").count(), 1);
    assert!(xml.contains(r#"android:endX="24""#));

    // Attributes wrap onto their own lines, so split on whole elements
    let items: Vec<&str> = xml
        .split("<item")
        .skip(1)
        .map(|rest| &rest[..rest.find("/>").unwrap()])
        .collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].contains(r#"android:offset="0""#));
    assert!(items[0].contains(r##"android:color="#FF00FF00""##));
    assert!(items[1].contains(r#"android:offset="1""#));
    assert!(items[1].contains(r##"android:color="#800000FF""##));
}

#[test]
fn test_dangling_use_expands_to_nothing() {
    let svg = r##"<svg viewBox="0 0 24 24"><use href="#nope" x="3"/></svg>"##;
    let doc = parse_svg(svg).unwrap();
    assert!(doc.elements.is_empty());

    let xml = convert_svg(svg, false).unwrap();
    assert!(!xml.contains("<path"));
    assert!(!xml.contains("<group"));
}

#[test]
fn test_use_chain_is_depth_limited() {
    let mut svg = String::from(r#"<svg viewBox="0 0 24 24"><defs><path id="u0" d="M0 0h1"/>"#);
    for i in 1..=15 {
        svg.push_str(&format!(r##"<g id="u{i}"><use href="#u{}"/></g>"##, i - 1));
    }
    svg.push_str(r##"</defs><use href="#u15"/><use href="#u5"/></svg>"##);

    let doc = parse_svg(&svg).unwrap();
    // Only the shallow chain reaches the path
    assert_eq!(doc.paths().len(), 1);
}

#[test]
fn test_lenient_values() {
    let svg = r#"<svg>
        <path d="M0 0h1" fill="chartreuse-ish"/>
        <g transform="wobble(3) translate(2 3)"><path d="M1 1h1"/></g>
    </svg>"#;
    let doc = parse_svg(svg).unwrap();

    assert_eq!(doc.paths()[0].fill, Fill::None);
    let SvgElement::Group(group) = &doc.elements[1] else {
        panic!("expected group");
    };
    let t = group.transform.as_ref().unwrap();
    assert_eq!((t.translate_x, t.translate_y), (Some(2.0), Some(3.0)));

    // Unknown fill with no stroke still renders in black
    let xml = convert_svg(svg, false).unwrap();
    assert!(xml.contains(r##"android:fillColor="#000000""##));
}

#[test]
fn test_stacking_order_survives_mixed_content() {
    let svg = r##"<svg viewBox="0 0 24 24">
        <rect id="bg" width="24" height="24" fill="#fff"/>
        <g id="mid" transform="scale(2)"><path d="M1 1h2"/></g>
        <path id="top" d="M5 5h1" fill="#123456"/>
    </svg>"##;

    let xml = convert_svg(svg, false).unwrap();
    let bg = xml.find(r#""bg""#).unwrap();
    let mid = xml.find(r#""mid""#).unwrap();
    let top = xml.find(r#""top""#).unwrap();
    assert!(bg < mid && mid < top);
    assert!(xml.contains(r##"android:fillColor="#123456""##));
}

#[test]
fn test_css_classes_apply() {
    let svg = r#"<svg viewBox="0 0 24 24">
        <style><![CDATA[ .accent { fill: rgb(255, 128, 0); } ]]></style>
        <path class="accent" d="M0 0h4"/>
    </svg>"#;
    let doc = parse_svg(svg).unwrap();
    assert_eq!(doc.paths()[0].fill, Fill::Solid(Color::rgb(255, 128, 0)));
}

#[test]
fn test_malformed_path_fails() {
    let err = convert_svg(r#"<svg><path d="M 0 0 C 1 2 3"/></svg>"#, false).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidPath(_)));
}

#[test]
fn test_not_svg() {
    let err = convert_svg("<html/>", false).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidSvg(_)));

    let err = convert_svg("<svg><path></svg>", false).unwrap_err();
    assert!(matches!(err, ConvertError::Xml(_)));
}

#[test]
fn test_validation_does_not_mutate() {
    let long = format!("M0 0{}", " 1 1".repeat(300));
    let svg = format!(r#"<svg><path id="long" d="{long}"/></svg>"#);
    let doc = parse_svg(&svg).unwrap();
    let before = doc.clone();

    let issues = validate_document(&doc);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path_id, "long");
    assert!(issues[0].exceeds_lint);
    assert_eq!(doc, before);
}
