use super::*;
use crate::foundation::core::Rect;

fn scene(nodes: Vec<Node>) -> Scene {
    Scene {
        width: 200,
        height: 100,
        background: Rgba8::rgb(9, 9, 11),
        nodes,
    }
}

#[test]
fn number_formatting_is_stable() {
    assert_eq!(num(1.0), "1");
    assert_eq!(num(1.25), "1.25");
    assert_eq!(num(2.0 / 3.0), "0.667");
    assert_eq!(num(-0.0001), "0");
    assert_eq!(num(-12.5), "-12.5");
    assert_eq!(num(f64::NAN), "0");
    assert_eq!(num(100.0), "100");
}

#[test]
fn document_has_header_and_background() {
    let svg = to_svg(&scene(Vec::new()));
    assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100""#));
    assert!(svg.contains(r##"<rect width="200" height="100" fill="#09090b"/>"##));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn translucent_paint_emits_opacity() {
    let svg = to_svg(&scene(vec![Node::Rect {
        rect: Rect::new(1.0, 2.0, 11.0, 22.0),
        radius: 1.0,
        fill: Rgba8::rgba(255, 255, 255, 51),
        stroke: Some(Stroke::new(Rgba8::rgb(59, 130, 246), 1.5)),
    }]));
    assert!(svg.contains(
        r##"<rect x="1" y="2" width="10" height="20" rx="1" fill="#ffffff" fill-opacity="0.2" stroke="#3b82f6" stroke-width="1.5"/>"##
    ));
}

#[test]
fn groups_skip_identity_and_invisible() {
    let dot = Node::Circle {
        center: Point::new(5.0, 5.0),
        radius: 2.0,
        fill: Rgba8::WHITE,
    };
    let svg = to_svg(&scene(vec![
        Node::group(Affine::IDENTITY, 1.0, vec![dot.clone()]),
        Node::group(Affine::translate((3.0, 4.0)), 0.5, vec![dot.clone()]),
        Node::group(Affine::IDENTITY, 0.0, vec![dot]),
    ]));
    assert!(svg.contains("<g><circle"));
    assert!(svg.contains(r#"<g transform="matrix(1 0 0 1 3 4)" opacity="0.5">"#));
    assert_eq!(svg.matches("<circle").count(), 2);
}

#[test]
fn blurred_polyline_gets_its_own_filter() {
    let line = |blur| Node::Polyline {
        points: vec![Point::new(0.0, 10.0), Point::new(50.0, 10.0)],
        stroke: Stroke::new(Rgba8::WHITE, 2.0),
        blur,
    };
    let svg = to_svg(&scene(vec![line(6.0), line(0.0), line(6.0)]));
    assert!(svg.contains(r#"<filter id="glow0" filterUnits="userSpaceOnUse" x="-20" y="-10" width="90" height="40">"#));
    assert!(svg.contains(r#"filter="url(#glow1)""#));
    assert_eq!(svg.matches("<polyline").count(), 3);
    assert!(svg.contains(r#"points="0,10 50,10""#));
}

#[test]
fn text_is_escaped_and_anchored() {
    let svg = to_svg(&scene(vec![Node::Text(TextRun {
        at: Point::new(10.0, 20.0),
        text: "H&S <top>".into(),
        size: 14.0,
        weight: 600,
        fill: Rgba8::WHITE,
        anchor: TextAnchor::Middle,
        monospace: true,
    })]));
    assert!(svg.contains("H&amp;S &lt;top&gt;</text>"));
    assert!(svg.contains(r#"text-anchor="middle""#));
    assert!(svg.contains(MONO));
}

#[test]
fn equal_scenes_serialize_identically() {
    let build = || {
        scene(vec![Node::Line {
            from: Point::new(0.1 + 0.2, 1.0),
            to: Point::new(3.0, 4.0),
            stroke: Stroke::new(Rgba8::BLACK, 1.0),
        }])
    };
    assert_eq!(to_svg(&build()), to_svg(&build()));
}
