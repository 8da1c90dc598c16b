use flex_host::{FlexHost, HostedBox, YAxis};
use flex_layout::{Bounds, Config, Edge, FlexDirection, Justify, Size, size};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[ctor::ctor]
fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

struct Label {
    text_width: f32,
    line_height: f32,
    bounds: Bounds<f32>,
}

impl Label {
    fn new(text_width: f32, line_height: f32) -> Self {
        Label {
            text_width,
            line_height,
            bounds: Bounds::default(),
        }
    }
}

impl HostedBox for Label {
    fn preferred_size(&self) -> Size<f32> {
        size(self.text_width, self.line_height)
    }

    fn min_size(&self) -> Option<Size<f32>> {
        Some(size(self.text_width, self.line_height))
    }

    fn set_bounds(&mut self, bounds: Bounds<f32>) {
        self.bounds = bounds;
    }
}

#[test]
fn test_reported_min_size_survives_a_narrow_host() {
    let mut host = FlexHost::new(Arc::new(Config::new()));
    host.set_size(20.0, 100.0);
    let label = host.add(Label::new(40.0, 12.0)).unwrap();

    host.layout().unwrap();
    let bounds = host.boxed(label).unwrap().bounds;
    assert!(bounds.size.width >= 40.0);
    assert_eq!(bounds.size.height, 12.0);
}

#[test]
fn test_min_size_includes_node_padding() {
    let mut host = FlexHost::new(Arc::new(Config::new()));
    host.set_size(10.0, 100.0);
    let label = host.add(Label::new(40.0, 12.0)).unwrap();
    host.tree_mut()
        .node_mut(label)
        .unwrap()
        .padding(Edge::All, 4.0);

    // Padding is only known after a first pass.
    host.layout().unwrap();
    host.layout().unwrap();
    assert_eq!(host.layout_bounds(label).unwrap().size, size(48.0, 20.0));
    assert_eq!(host.boxed(label).unwrap().bounds.size, size(40.0, 12.0));
}

#[test]
fn test_toolbar_in_bottom_up_host() {
    let mut host = FlexHost::new(Arc::new(Config::new()));
    host.set_size(200.0, 50.0);
    host.set_y_axis(YAxis::Up);
    let root = host.root();
    host.tree_mut()
        .node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .justify_content(Justify::SpaceBetween)
        .padding(Edge::All, 5.0);
    let first = host.add(Label::new(30.0, 10.0)).unwrap();
    let last = host.add(Label::new(50.0, 10.0)).unwrap();

    host.layout().unwrap();
    let first_bounds = host.boxed(first).unwrap().bounds;
    let last_bounds = host.boxed(last).unwrap().bounds;
    assert_eq!(first_bounds.origin.x, 5.0);
    assert_eq!(last_bounds.origin.x, 145.0);
    assert_eq!(first_bounds.size, size(30.0, 40.0));
    assert_eq!(first_bounds.origin.y, 5.0);
}
