use super::*;
use crate::foundation::color::Rgba8;
use crate::foundation::core::Rect;
use crate::scene::model::Node;

fn scene() -> Scene {
    Scene {
        width: 40,
        height: 20,
        background: Rgba8::rgb(10, 20, 30),
        nodes: vec![Node::Rect {
            rect: Rect::new(20.0, 0.0, 40.0, 20.0),
            radius: 0.0,
            fill: Rgba8::WHITE,
            stroke: None,
        }],
    }
}

#[test]
fn renders_scene_at_its_size() {
    let frame = Rasterizer::new().render_scene(&scene()).unwrap();
    assert_eq!((frame.width, frame.height), (40, 20));
    assert_eq!(frame.data.len(), 40 * 20 * 4);
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(5, 10), Some([10, 20, 30, 255]));
    assert_eq!(frame.pixel(30, 10), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(40, 0), None);
}

#[test]
fn rendering_is_deterministic() {
    let r = Rasterizer::new();
    let a = r.render_scene(&scene()).unwrap();
    let b = r.clone().render_scene(&scene()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_svg_is_an_error() {
    assert!(Rasterizer::new().render_svg("<svg").is_err());
}

#[test]
fn straight_alpha_unpremultiplies() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![64, 32, 0, 128, 0, 0, 0, 0],
        premultiplied: true,
    };
    assert_eq!(frame.to_straight_rgba8(), vec![128, 64, 0, 128, 0, 0, 0, 0]);
}
