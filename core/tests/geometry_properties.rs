use proptest::prelude::*;
use workspace_core::geometry::{compute_connector, compute_positions, MIN_EXTENT};
use workspace_core::{
    AgentKey, AssignmentBoard, AssignmentRow, ContainerSize, Point, WorkspaceId, BOARD_ROSTER,
};

fn point() -> impl Strategy<Value = Point> {
    (-2000.0f64..2000.0, -2000.0f64..2000.0).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn prop_one_distinct_ordered_position_per_member(
        width in MIN_EXTENT..4000.0,
        height in MIN_EXTENT..3000.0,
    ) {
        let layout = compute_positions(ContainerSize::new(width, height), &BOARD_ROSTER);
        prop_assert_eq!(layout.len(), BOARD_ROSTER.len());

        let points: Vec<Point> = layout.iter().map(|(_, p)| p).collect();
        for (i, a) in points.iter().enumerate() {
            prop_assert!(a.x >= 0.0 && a.x <= width);
            prop_assert!(a.y >= 0.0 && a.y <= height);
            for b in &points[i + 1..] {
                prop_assert!(a != b, "positions must be distinct");
            }
        }
        for pair in points.windows(2) {
            prop_assert!(pair[0].x < pair[1].x, "left-to-right order broken");
        }
    }

    #[test]
    fn prop_zigzag_alternates_around_center(
        width in MIN_EXTENT..4000.0,
        height in MIN_EXTENT..3000.0,
    ) {
        let layout = compute_positions(ContainerSize::new(width, height), &BOARD_ROSTER);
        let center = height / 2.0;
        for (i, (_, p)) in layout.iter().enumerate() {
            if i % 2 == 0 {
                prop_assert!(p.y < center);
            } else {
                prop_assert!(p.y > center);
            }
        }
    }

    #[test]
    fn prop_layout_never_panics(width in any::<f64>(), height in any::<f64>()) {
        let layout = compute_positions(ContainerSize::new(width, height), &BOARD_ROSTER);
        prop_assert_eq!(layout.len(), 6);
        prop_assert!(layout.iter().all(|(_, p)| p.is_finite()));
    }

    #[test]
    fn prop_connector_is_deterministic(a in point(), b in point()) {
        let first = compute_connector(a, b);
        let second = compute_connector(a, b);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.start, a);
        prop_assert_eq!(first.end, b);
    }

    #[test]
    fn prop_changed_tool_gets_fresh_layout_position(
        width in MIN_EXTENT..2000.0,
        height in MIN_EXTENT..2000.0,
    ) {
        let size = ContainerSize::new(width, height);
        let id = WorkspaceId::from("prop");
        let mut board = AssignmentBoard::new(id.clone(), size);

        board.apply_snapshot(&AssignmentRow::empty(&id).with(AgentKey::Sara, "HubSpot"));
        board.apply_snapshot(&AssignmentRow::empty(&id).with(AgentKey::Sara, "Pipedrive"));

        let fresh = compute_positions(size, &BOARD_ROSTER).position(AgentKey::Sara);
        prop_assert_eq!(board.get(AgentKey::Sara).map(|a| a.position), fresh);
    }
}
