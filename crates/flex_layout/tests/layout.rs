use flex_layout::{
    Align, Bounds, Config, Direction, Edge, ErrorKind, FlexDirection, LayoutEdge, LayoutEvents,
    LayoutPassReason, LayoutTree, Length, MeasureMode, NodeId, NodeType, PositionType, Size,
    Wrap, point, size,
};
use pretty_assertions::assert_eq;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

#[ctor::ctor]
fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

fn bounds(x: f32, y: f32, width: f32, height: f32) -> Bounds<f32> {
    Bounds {
        origin: point(x, y),
        size: size(width, height),
    }
}

fn layout_bounds(tree: &LayoutTree, id: NodeId) -> Bounds<f32> {
    tree.layout(id).unwrap().bounds()
}

fn unconstrained() -> Size<Option<f32>> {
    size(None, None)
}

fn row_with_fixed_children(widths: &[f32]) -> (LayoutTree, NodeId, Vec<NodeId>) {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .width(300.0)
        .height(100.0);
    let children = widths
        .iter()
        .map(|width| {
            let child = tree.new_node();
            tree.node_mut(child).unwrap().width(*width).height(10.0);
            tree.push_child(root, child).unwrap();
            child
        })
        .collect();
    (tree, root, children)
}

#[test]
fn test_explicit_sizes_are_kept_unless_clamped() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root).unwrap().width(200.0).height(200.0);
    let sized = tree.new_node();
    tree.node_mut(sized).unwrap().width(50.0).height(30.0);
    let clamped = tree.new_node();
    tree.node_mut(clamped)
        .unwrap()
        .width(50.0)
        .max_width(40.0)
        .height(10.0)
        .min_height(25.0);
    let percent = tree.new_node();
    tree.node_mut(percent)
        .unwrap()
        .width(Length::percent(50.0))
        .height(Length::percent(10.0));
    for child in [sized, clamped, percent] {
        tree.push_child(root, child).unwrap();
    }

    tree.calculate_layout(root, size(Some(500.0), Some(500.0)), Direction::Ltr)
        .unwrap();

    assert_eq!(tree.layout(root).unwrap().size(), size(200.0, 200.0));
    assert_eq!(tree.layout(sized).unwrap().size(), size(50.0, 30.0));
    assert_eq!(tree.layout(clamped).unwrap().size(), size(40.0, 25.0));
    assert_eq!(tree.layout(percent).unwrap().size(), size(100.0, 20.0));
}

#[test]
fn test_row_placement_left_to_right() {
    let (mut tree, root, children) = row_with_fixed_children(&[50.0, 60.0, 70.0]);
    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();

    let lefts: Vec<f32> = children
        .iter()
        .map(|child| tree.layout(*child).unwrap().left())
        .collect();
    assert_eq!(lefts, vec![0.0, 50.0, 110.0]);
}

#[test]
fn test_row_placement_right_to_left_is_mirrored() {
    let (mut tree, root, children) = row_with_fixed_children(&[50.0, 60.0, 70.0]);
    tree.calculate_layout(root, unconstrained(), Direction::Rtl)
        .unwrap();

    let lefts: Vec<f32> = children
        .iter()
        .map(|child| tree.layout(*child).unwrap().left())
        .collect();
    assert_eq!(lefts, vec![250.0, 190.0, 120.0]);
    assert_eq!(tree.layout(root).unwrap().direction(), Direction::Rtl);
}

#[test]
fn test_clone_lays_out_like_the_original() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .flex_wrap(Wrap::Wrap)
        .width(120.0)
        .padding(Edge::All, 4.0);
    for grow in [1.0, 2.0, 0.0] {
        let child = tree.new_node();
        tree.node_mut(child)
            .unwrap()
            .flex_grow(grow)
            .flex_basis(30.0)
            .height(20.0)
            .margin(Edge::Horizontal, 2.0);
        let grandchild = tree.new_node();
        tree.node_mut(grandchild).unwrap().height(Length::percent(50.0));
        tree.push_child(child, grandchild).unwrap();
        tree.push_child(root, child).unwrap();
    }

    let copy = tree.clone_with_children(root).unwrap();
    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    tree.calculate_layout(copy, unconstrained(), Direction::Ltr)
        .unwrap();

    let mut pairs = vec![(root, copy)];
    while let Some((original, cloned)) = pairs.pop() {
        assert_ne!(original, cloned);
        assert_eq!(layout_bounds(&tree, original), layout_bounds(&tree, cloned));
        let original_children = tree.children(original).unwrap().to_vec();
        let cloned_children = tree.children(cloned).unwrap().to_vec();
        assert_eq!(original_children.len(), cloned_children.len());
        pairs.extend(original_children.into_iter().zip(cloned_children));
    }
}

#[test]
fn test_second_layout_reuses_cached_measurements() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .width(200.0)
        .height(100.0);
    let text = tree.new_node();
    let counter = calls.clone();
    tree.set_measure_func(
        text,
        Some(Arc::new(move |_, _, _, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            size(50.0, 20.0)
        })),
    )
    .unwrap();
    tree.push_child(root, text).unwrap();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    let first_calls = calls.load(Ordering::SeqCst);
    let first = layout_bounds(&tree, text);
    assert!(first_calls > 0);
    assert_eq!(tree.events().measure_callbacks as usize, first_calls);
    assert_eq!(first, bounds(0.0, 0.0, 50.0, 100.0));

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), first_calls);
    assert_eq!(tree.events().measure_callbacks, 0);
    assert_eq!(layout_bounds(&tree, text), first);
    assert_eq!(layout_bounds(&tree, root), bounds(0.0, 0.0, 200.0, 100.0));
}

#[test]
fn test_style_change_invalidates_cached_layout() {
    let (mut tree, root, children) = row_with_fixed_children(&[50.0, 60.0]);
    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    tree.mark_layout_seen(children[1]).unwrap();
    assert!(!tree.is_dirty(root).unwrap());

    tree.node_mut(children[0]).unwrap().width(80.0);
    assert!(tree.is_dirty(children[0]).unwrap());
    assert!(tree.is_dirty(root).unwrap());
    assert!(!tree.is_dirty(children[1]).unwrap());

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert!(!tree.is_dirty(root).unwrap());
    assert!(tree.has_new_layout(children[1]).unwrap());
    assert_eq!(tree.layout(children[1]).unwrap().left(), 80.0);
}

#[test]
fn test_wrap_starts_a_new_line() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .flex_wrap(Wrap::Wrap)
        .width(100.0);
    let first = tree.new_node();
    tree.node_mut(first).unwrap().width(60.0).height(20.0);
    let second = tree.new_node();
    tree.node_mut(second).unwrap().width(60.0).height(30.0);
    tree.push_child(root, first).unwrap();
    tree.push_child(root, second).unwrap();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();

    assert_eq!(layout_bounds(&tree, first), bounds(0.0, 0.0, 60.0, 20.0));
    assert_eq!(layout_bounds(&tree, second), bounds(0.0, 20.0, 60.0, 30.0));
    assert_eq!(tree.layout(root).unwrap().height(), 50.0);
}

fn absolute_child(tree: &mut LayoutTree, root: NodeId) -> NodeId {
    let child = tree.new_node();
    tree.node_mut(child)
        .unwrap()
        .position_type(PositionType::Absolute)
        .width(10.0)
        .height(10.0);
    tree.push_child(root, child).unwrap();
    child
}

fn square_root(tree: &mut LayoutTree, side: f32) -> NodeId {
    let root = tree.new_node();
    tree.node_mut(root).unwrap().width(side).height(side);
    root
}

#[test]
fn test_absolute_offsets_left_to_right() {
    let mut tree = LayoutTree::new();
    let root = square_root(&mut tree, 100.0);
    let child = absolute_child(&mut tree, root);
    tree.node_mut(child)
        .unwrap()
        .position(Edge::Left, 10.0)
        .position(Edge::Top, 10.0);

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(layout_bounds(&tree, child), bounds(10.0, 10.0, 10.0, 10.0));
}

#[test]
fn test_absolute_start_offset_right_to_left() {
    let mut tree = LayoutTree::new();
    let root = square_root(&mut tree, 100.0);
    tree.node_mut(root).unwrap().flex_direction(FlexDirection::Row);
    let child = absolute_child(&mut tree, root);
    tree.node_mut(child)
        .unwrap()
        .position(Edge::Start, 10.0)
        .position(Edge::Top, 10.0);

    tree.calculate_layout(root, unconstrained(), Direction::Rtl)
        .unwrap();
    assert_eq!(layout_bounds(&tree, child), bounds(80.0, 10.0, 10.0, 10.0));
}

#[test]
fn test_absolute_end_offset_left_to_right() {
    let mut tree = LayoutTree::new();
    let root = square_root(&mut tree, 100.0);
    tree.node_mut(root).unwrap().flex_direction(FlexDirection::Row);
    let child = absolute_child(&mut tree, root);
    tree.node_mut(child)
        .unwrap()
        .position(Edge::End, 10.0)
        .position(Edge::Top, 0.0);

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(layout_bounds(&tree, child), bounds(80.0, 0.0, 10.0, 10.0));
}

#[test]
fn test_absolute_offsets_start_inside_the_border() {
    let mut tree = LayoutTree::new();
    let root = square_root(&mut tree, 100.0);
    tree.node_mut(root).unwrap().border(Edge::All, 10.0);
    let child = absolute_child(&mut tree, root);
    tree.node_mut(child)
        .unwrap()
        .position(Edge::Left, 0.0)
        .position(Edge::Top, 0.0);

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(layout_bounds(&tree, child), bounds(10.0, 10.0, 10.0, 10.0));
    assert_eq!(tree.layout(root).unwrap().border(LayoutEdge::Start), 10.0);
}

#[test]
fn test_absolute_percentage_offsets() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root).unwrap().width(100.0).height(200.0);
    let top = absolute_child(&mut tree, root);
    tree.node_mut(top)
        .unwrap()
        .position(Edge::Top, Length::percent(50.0));
    let bottom = absolute_child(&mut tree, root);
    tree.node_mut(bottom)
        .unwrap()
        .position(Edge::Bottom, Length::percent(10.0));

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(tree.layout(top).unwrap().top(), 100.0);
    assert_eq!(tree.layout(bottom).unwrap().top(), 170.0);
}

#[test]
fn test_absolute_size_from_opposing_offsets() {
    let mut tree = LayoutTree::new();
    let root = square_root(&mut tree, 100.0);
    let child = tree.new_node();
    tree.node_mut(child)
        .unwrap()
        .position_type(PositionType::Absolute)
        .position(Edge::All, 10.0);
    tree.push_child(root, child).unwrap();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(layout_bounds(&tree, child), bounds(10.0, 10.0, 80.0, 80.0));
}

#[test]
fn test_absolute_child_follows_wrap_reverse() {
    let mut tree = LayoutTree::new();
    let root = square_root(&mut tree, 100.0);
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .flex_wrap(Wrap::WrapReverse);
    let child = absolute_child(&mut tree, root);

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(layout_bounds(&tree, child), bounds(0.0, 90.0, 10.0, 10.0));
}

#[test]
fn test_results_are_rounded_to_the_pixel_grid() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .width(100.0)
        .height(20.0);
    let children: Vec<NodeId> = (0..3)
        .map(|_| {
            let child = tree.new_node();
            tree.node_mut(child).unwrap().flex_grow(1.0);
            tree.push_child(root, child).unwrap();
            child
        })
        .collect();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    let placed: Vec<(f32, f32)> = children
        .iter()
        .map(|child| {
            let layout = tree.layout(*child).unwrap();
            (layout.left(), layout.width())
        })
        .collect();
    assert_eq!(placed, vec![(0.0, 33.0), (33.0, 34.0), (67.0, 33.0)]);
}

#[test]
fn test_rounding_can_be_disabled() {
    let config = Arc::new(Config::new().with_point_scale_factor(0.0));
    let mut tree = LayoutTree::with_config(config);
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .width(100.0)
        .height(20.0);
    let child = tree.new_node();
    tree.node_mut(child).unwrap().flex_grow(1.0);
    let sibling = tree.new_node();
    tree.node_mut(sibling).unwrap().flex_grow(2.0);
    tree.push_child(root, child).unwrap();
    tree.push_child(root, sibling).unwrap();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    let width = tree.layout(child).unwrap().width();
    assert!((width - 100.0 / 3.0).abs() < 0.001);
}

#[test]
fn test_measured_root_sizes_to_content() {
    let modes = Arc::new(Mutex::new(Vec::new()));
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root).unwrap().max_width(100.0);
    let seen = modes.clone();
    tree.set_measure_func(
        root,
        Some(Arc::new(
            move |_, width: f32, width_mode: MeasureMode, _, height_mode: MeasureMode| {
                seen.lock().unwrap().push((width_mode, height_mode));
                size(width.min(60.0), 20.0)
            },
        )),
    )
    .unwrap();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(tree.node_type(root).unwrap(), NodeType::Text);
    assert_eq!(tree.layout(root).unwrap().size(), size(60.0, 20.0));
    assert_eq!(
        modes.lock().unwrap().as_slice(),
        &[(MeasureMode::AtMost, MeasureMode::Undefined)]
    );
    assert_eq!(tree.events().measure_callbacks_for(LayoutPassReason::Initial), 1);
}

#[test]
fn test_events_count_layouts_and_measures() {
    let (mut tree, root, _) = row_with_fixed_children(&[50.0, 60.0]);
    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    let events = tree.events().clone();
    assert!(events.layouts >= 3);
    assert_eq!(events.measure_callbacks, 0);
    assert!(events.max_measure_cache <= 16);
}

#[test]
fn test_text_node_without_measure_func_fails_before_layout() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root).unwrap().width(100.0).height(100.0);
    let text = tree.new_node();
    tree.set_node_type(text, NodeType::Text).unwrap();
    tree.push_child(root, text).unwrap();

    let error = tree
        .calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MeasureFunctionUndefined);
    assert!(tree.layout(root).unwrap().width().is_nan());

    tree.node_mut(text).unwrap().width(10.0).height(10.0);
    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(tree.layout(text).unwrap().size(), size(10.0, 10.0));
}

#[test]
fn test_freed_node_is_an_invalid_root() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.free(root).unwrap();

    let error = tree
        .calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidNode);
}

#[test]
fn test_freeze_runs_root_first_then_breadth_first() {
    let visited = Arc::new(Mutex::new(Vec::new()));
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    let left = tree.new_node();
    let right = tree.new_node();
    let leaf = tree.new_node();
    tree.push_child(root, left).unwrap();
    tree.push_child(root, right).unwrap();
    tree.push_child(left, leaf).unwrap();
    for id in [root, left, right, leaf] {
        let visited = visited.clone();
        tree.set_freeze_func(
            id,
            Some(Arc::new(move |node, owner| {
                visited.lock().unwrap().push((node, owner));
            })),
        )
        .unwrap();
    }

    tree.calculate_layout(root, size(Some(100.0), Some(100.0)), Direction::Ltr)
        .unwrap();
    assert_eq!(
        visited.lock().unwrap().as_slice(),
        &[
            (root, None),
            (left, Some(root)),
            (right, Some(root)),
            (leaf, Some(left)),
        ]
    );
}

#[test]
fn test_dirtied_callback_after_layout() {
    let dirtied = Arc::new(AtomicUsize::new(0));
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root).unwrap().width(100.0).height(100.0);
    let text = tree.new_node();
    tree.set_measure_func(text, Some(Arc::new(|_, _, _, _, _| size(10.0, 10.0))))
        .unwrap();
    let counter = dirtied.clone();
    tree.set_dirtied_func(
        text,
        Some(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
    )
    .unwrap();
    tree.push_child(root, text).unwrap();
    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();

    tree.mark_dirty(text).unwrap();
    tree.mark_dirty(text).unwrap();
    assert_eq!(dirtied.load(Ordering::SeqCst), 1);
    assert!(tree.is_dirty(root).unwrap());

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    tree.mark_dirty(text).unwrap();
    assert_eq!(dirtied.load(Ordering::SeqCst), 2);
}

#[test]
fn test_legacy_stretch_diff_leaves_the_tree_intact() {
    let config = Arc::new(
        Config::new()
            .with_legacy_stretch_behaviour(true)
            .with_diff_layout_without_legacy_stretch_behaviour(true),
    );
    let mut tree = LayoutTree::with_config(config);
    let root = tree.new_node();
    tree.node_mut(root).unwrap().width(100.0).height(100.0);
    let child = tree.new_node();
    tree.node_mut(child).unwrap().height(20.0);
    tree.push_child(root, child).unwrap();
    let node_count = tree.len();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(tree.len(), node_count);
    assert_eq!(layout_bounds(&tree, child), bounds(0.0, 0.0, 100.0, 20.0));
    assert!(!tree.does_legacy_stretch_flag_affect_layout(root).unwrap());
}

#[test]
fn test_repeated_layout_keeps_rounded_results() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root).unwrap().width(33.3).height(10.6);
    let child = tree.new_node();
    tree.node_mut(child).unwrap().flex_grow(1.0);
    tree.push_child(root, child).unwrap();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(layout_bounds(&tree, root), bounds(0.0, 0.0, 33.0, 11.0));
    assert_eq!(layout_bounds(&tree, child), bounds(0.0, 0.0, 33.0, 11.0));

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(tree.events().layouts, 0);
    assert_eq!(layout_bounds(&tree, root), bounds(0.0, 0.0, 33.0, 11.0));
    assert_eq!(layout_bounds(&tree, child), bounds(0.0, 0.0, 33.0, 11.0));
}

fn lefts(tree: &LayoutTree, children: &[NodeId]) -> Vec<f32> {
    children
        .iter()
        .map(|child| tree.layout(*child).unwrap().left())
        .collect()
}

fn tops(tree: &LayoutTree, children: &[NodeId]) -> Vec<f32> {
    children
        .iter()
        .map(|child| tree.layout(*child).unwrap().top())
        .collect()
}

#[test]
fn test_row_reverse_places_items_from_the_right() {
    let (mut tree, root, children) = row_with_fixed_children(&[50.0, 60.0, 70.0]);
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::RowReverse);
    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(lefts(&tree, &children), vec![250.0, 190.0, 120.0]);

    // Right to left text flips a reversed row back.
    tree.calculate_layout(root, unconstrained(), Direction::Rtl)
        .unwrap();
    assert_eq!(lefts(&tree, &children), vec![0.0, 50.0, 110.0]);
}

#[test]
fn test_column_reverse_places_items_from_the_bottom() {
    let mut tree = LayoutTree::new();
    let root = square_root(&mut tree, 100.0);
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::ColumnReverse);
    let children: Vec<NodeId> = [10.0, 20.0]
        .iter()
        .map(|height| {
            let child = tree.new_node();
            tree.node_mut(child).unwrap().width(10.0).height(*height);
            tree.push_child(root, child).unwrap();
            child
        })
        .collect();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(tops(&tree, &children), vec![90.0, 70.0]);
}

#[test]
fn test_align_items_center_and_flex_end() {
    for (align, top) in [(Align::Center, 40.0), (Align::FlexEnd, 80.0)] {
        let mut tree = LayoutTree::new();
        let root = square_root(&mut tree, 100.0);
        tree.node_mut(root)
            .unwrap()
            .flex_direction(FlexDirection::Row)
            .align_items(align);
        let child = tree.new_node();
        tree.node_mut(child).unwrap().width(10.0).height(20.0);
        tree.push_child(root, child).unwrap();

        tree.calculate_layout(root, unconstrained(), Direction::Ltr)
            .unwrap();
        assert_eq!(layout_bounds(&tree, child), bounds(0.0, top, 10.0, 20.0), "{align}");
    }
}

/// Two 10 high lines in a 100 square wrapping row, distributed by `align`.
fn wrapped_line_tops(align: Align) -> Vec<f32> {
    let mut tree = LayoutTree::new();
    let root = square_root(&mut tree, 100.0);
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .flex_wrap(Wrap::Wrap)
        .align_content(align);
    let children: Vec<NodeId> = (0..2)
        .map(|_| {
            let child = tree.new_node();
            tree.node_mut(child).unwrap().width(60.0).height(10.0);
            tree.push_child(root, child).unwrap();
            child
        })
        .collect();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    for child in &children {
        assert_eq!(tree.layout(*child).unwrap().size(), size(60.0, 10.0));
    }
    tops(&tree, &children)
}

#[test]
fn test_align_content_distributes_lines() {
    assert_eq!(wrapped_line_tops(Align::FlexStart), vec![0.0, 10.0]);
    assert_eq!(wrapped_line_tops(Align::FlexEnd), vec![80.0, 90.0]);
    assert_eq!(wrapped_line_tops(Align::Center), vec![40.0, 50.0]);
    assert_eq!(wrapped_line_tops(Align::Stretch), vec![0.0, 50.0]);
    assert_eq!(wrapped_line_tops(Align::SpaceBetween), vec![0.0, 90.0]);
    assert_eq!(wrapped_line_tops(Align::SpaceAround), vec![20.0, 70.0]);
}

#[test]
fn test_shrinking_stops_at_min_size() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .width(100.0)
        .height(10.0);
    let first = tree.new_node();
    tree.node_mut(first)
        .unwrap()
        .width(60.0)
        .min_width(55.0)
        .flex_shrink(1.0);
    let second = tree.new_node();
    tree.node_mut(second).unwrap().width(60.0).flex_shrink(1.0);
    tree.push_child(root, first).unwrap();
    tree.push_child(root, second).unwrap();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    // The shrink the first item cannot take goes to the second one.
    assert_eq!(layout_bounds(&tree, first), bounds(0.0, 0.0, 55.0, 10.0));
    assert_eq!(layout_bounds(&tree, second), bounds(55.0, 0.0, 45.0, 10.0));
}

#[test]
fn test_aspect_ratio_derives_the_cross_size() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .align_items(Align::FlexStart)
        .width(200.0)
        .height(100.0);
    let wide = tree.new_node();
    tree.node_mut(wide).unwrap().width(40.0).aspect_ratio(2.0);
    tree.push_child(root, wide).unwrap();

    let column = tree.new_node();
    tree.node_mut(column)
        .unwrap()
        .align_items(Align::FlexStart)
        .width(100.0)
        .height(100.0);
    tree.push_child(root, column).unwrap();
    let tall = tree.new_node();
    tree.node_mut(tall).unwrap().height(30.0).aspect_ratio(2.0);
    tree.push_child(column, tall).unwrap();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    assert_eq!(tree.layout(wide).unwrap().size(), size(40.0, 20.0));
    assert_eq!(tree.layout(tall).unwrap().size(), size(60.0, 30.0));
}

/// Lays out two wrapped lines of measured items with the given vertical margin and returns
/// the item tops and the pass's events.
fn stretched_lines(margin: f32) -> (Vec<f32>, LayoutEvents) {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.node_mut(root)
        .unwrap()
        .flex_direction(FlexDirection::Row)
        .flex_wrap(Wrap::Wrap)
        .width(100.0)
        .height(2.0 * (10.0 + 2.0 * margin));
    let children: Vec<NodeId> = (0..2)
        .map(|_| {
            let child = tree.new_node();
            tree.node_mut(child)
                .unwrap()
                .width(60.0)
                .margin(Edge::Vertical, margin);
            tree.set_measure_func(child, Some(Arc::new(|_, _, _, _, _| size(60.0, 10.0))))
                .unwrap();
            tree.push_child(root, child).unwrap();
            child
        })
        .collect();

    tree.calculate_layout(root, unconstrained(), Direction::Ltr)
        .unwrap();
    for child in &children {
        assert_eq!(tree.layout(*child).unwrap().height(), 10.0);
    }
    (tops(&tree, &children), tree.events().clone())
}

#[test]
fn test_lines_already_stretched_are_not_laid_out_again() {
    let (plain_tops, plain) = stretched_lines(0.0);
    let (margin_tops, with_margins) = stretched_lines(5.0);
    assert_eq!(plain_tops, vec![0.0, 10.0]);
    assert_eq!(margin_tops, vec![5.0, 25.0]);
    assert_eq!(
        with_margins.layouts + with_margins.cached_layouts,
        plain.layouts + plain.cached_layouts
    );
}
