//! Pointer-driven capture of a new ROI shape.
//!
//! Lines and rectangles are drawn with a single drag: pointer-down anchors the
//! first point, moves track the second, pointer-up commits both.
//!
//! Polygons are built one vertex per click. Every pointer-down appends a vertex,
//! moving while pressed drags that newest vertex, and every pointer-up with at
//! least three vertices commits the polygon drawn so far. The vertex buffer
//! outlives the individual clicks, so further clicks keep extending the same
//! polygon until it is closed with [`DrawingEvent::ClosePolygon`], the type
//! changes, or the drawing is reset.

use log::debug;

use crate::geometry::{NormalizedPoint, Shape, ShapeKind};
use crate::mapper::{overlay_for_points, Overlay, Viewport};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingState {
	Idle,
	Capturing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawingEvent {
	PointerDown(NormalizedPoint),
	PointerMove(NormalizedPoint),
	PointerUp,
	TypeChanged(ShapeKind),
	Reset,
	ClosePolygon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawingOutcome {
	/// Nothing for the owner to apply.
	Unchanged,
	/// Pointer went down with no shape type selected.
	SelectTypeFirst,
	/// A complete shape replaces the ROI's points.
	Committed(Shape),
	/// The ROI's points must be cleared.
	Cleared,
}

#[derive(Debug, Clone)]
pub struct DrawingStateMachine {
	kind: ShapeKind,
	state: DrawingState,
	buffer: Vec<NormalizedPoint>,
}

impl DrawingStateMachine {
	pub fn new(kind: ShapeKind) -> Self {
		Self {
			kind,
			state: DrawingState::Idle,
			buffer: Vec::new(),
		}
	}

	pub fn kind(&self) -> ShapeKind {
		self.kind
	}

	pub fn state(&self) -> DrawingState {
		self.state
	}

	/// Points drawn but not yet committed.
	pub fn buffer(&self) -> &[NormalizedPoint] {
		&self.buffer
	}

	pub fn handle(&mut self, event: DrawingEvent) -> DrawingOutcome {
		match event {
			DrawingEvent::PointerDown(point) => self.pointer_down(point),
			DrawingEvent::PointerMove(point) => self.pointer_move(point),
			DrawingEvent::PointerUp => self.pointer_up(),
			DrawingEvent::TypeChanged(kind) => {
				self.kind = kind;
				self.abandon();
				DrawingOutcome::Cleared
			},
			DrawingEvent::Reset => {
				self.abandon();
				DrawingOutcome::Cleared
			},
			DrawingEvent::ClosePolygon => self.close_polygon(),
		}
	}

	/// Drops any in-progress gesture without touching the committed ROI.
	pub fn abandon(&mut self) {
		self.state = DrawingState::Idle;
		self.buffer.clear();
	}

	/// What the canvas should draw for the gesture in progress.
	pub fn preview_overlay(&self, viewport: Viewport) -> Option<Overlay> {
		overlay_for_points(self.kind, &self.buffer, viewport)
	}

	fn pointer_down(&mut self, point: NormalizedPoint) -> DrawingOutcome {
		match self.kind {
			ShapeKind::None => {
				debug!("pointer down ignored, no ROI type selected");
				return DrawingOutcome::SelectTypeFirst;
			},
			ShapeKind::Line | ShapeKind::Rectangle => {
				self.buffer.clear();
				self.buffer.push(point);
			},
			ShapeKind::Polygon => self.buffer.push(point),
		}
		self.state = DrawingState::Capturing;
		DrawingOutcome::Unchanged
	}

	fn pointer_move(&mut self, point: NormalizedPoint) -> DrawingOutcome {
		if self.state != DrawingState::Capturing {
			return DrawingOutcome::Unchanged;
		}
		match self.kind {
			ShapeKind::Line | ShapeKind::Rectangle => {
				self.buffer.truncate(1);
				self.buffer.push(point);
			},
			ShapeKind::Polygon => {
				if let Some(last) = self.buffer.last_mut() {
					*last = point;
				}
			},
			ShapeKind::None => {},
		}
		DrawingOutcome::Unchanged
	}

	fn pointer_up(&mut self) -> DrawingOutcome {
		if self.state != DrawingState::Capturing {
			return DrawingOutcome::Unchanged;
		}
		self.state = DrawingState::Idle;

		match self.kind {
			ShapeKind::Polygon if self.buffer.len() > 2 => self.commit(self.buffer.clone()),
			ShapeKind::Polygon => DrawingOutcome::Unchanged,
			_ => {
				let points = std::mem::take(&mut self.buffer);
				if points.len() == 2 {
					self.commit(points)
				} else {
					debug!("discarding {} point gesture for {}", points.len(), self.kind);
					DrawingOutcome::Unchanged
				}
			},
		}
	}

	fn close_polygon(&mut self) -> DrawingOutcome {
		if self.kind != ShapeKind::Polygon {
			return DrawingOutcome::Unchanged;
		}
		let vertices = std::mem::take(&mut self.buffer);
		self.state = DrawingState::Idle;
		if vertices.len() > 2 {
			self.commit(vertices)
		} else {
			DrawingOutcome::Unchanged
		}
	}

	fn commit(&self, points: Vec<NormalizedPoint>) -> DrawingOutcome {
		match Shape::from_points(self.kind, points) {
			Ok(shape) => DrawingOutcome::Committed(shape),
			Err(err) => {
				debug!("gesture did not form a shape: {}", err);
				DrawingOutcome::Unchanged
			},
		}
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	fn p(x: f64, y: f64) -> NormalizedPoint {
		NormalizedPoint::new(x, y)
	}

	fn committed_points(outcome: DrawingOutcome) -> Vec<NormalizedPoint> {
		match outcome {
			DrawingOutcome::Committed(shape) => shape.points(),
			other => panic!("expected a committed shape, got {:?}", other),
		}
	}

	#[test]
	fn pointer_down_without_type_warns() {
		let mut machine = DrawingStateMachine::new(ShapeKind::None);
		assert_eq!(machine.handle(DrawingEvent::PointerDown(p(0.5, 0.5))), DrawingOutcome::SelectTypeFirst);
		assert_eq!(machine.state(), DrawingState::Idle);
		assert!(machine.buffer().is_empty());
	}

	#[test]
	fn rectangle_drag_snaps_to_corners() {
		let mut machine = DrawingStateMachine::new(ShapeKind::Rectangle);
		machine.handle(DrawingEvent::PointerDown(p(0.01, 0.01)));
		assert_eq!(machine.state(), DrawingState::Capturing);
		machine.handle(DrawingEvent::PointerMove(p(0.5, 0.5)));
		machine.handle(DrawingEvent::PointerMove(p(0.99, 0.99)));
		assert_eq!(machine.buffer().len(), 2);

		let points = committed_points(machine.handle(DrawingEvent::PointerUp));
		assert_eq!(points, vec![p(0.0, 0.0), p(1.0, 1.0)]);
		assert_eq!(machine.state(), DrawingState::Idle);
		assert!(machine.buffer().is_empty());
	}

	#[test]
	fn line_click_without_drag_is_discarded() {
		let mut machine = DrawingStateMachine::new(ShapeKind::Line);
		machine.handle(DrawingEvent::PointerDown(p(0.3, 0.3)));
		assert_eq!(machine.handle(DrawingEvent::PointerUp), DrawingOutcome::Unchanged);
		assert!(machine.buffer().is_empty());
	}

	#[test]
	fn moves_while_idle_are_ignored() {
		let mut machine = DrawingStateMachine::new(ShapeKind::Line);
		machine.handle(DrawingEvent::PointerMove(p(0.3, 0.3)));
		assert!(machine.buffer().is_empty());
		assert_eq!(machine.handle(DrawingEvent::PointerUp), DrawingOutcome::Unchanged);
	}

	#[test]
	fn polygon_commits_from_third_vertex_on() {
		let mut machine = DrawingStateMachine::new(ShapeKind::Polygon);

		machine.handle(DrawingEvent::PointerDown(p(0.1, 0.1)));
		assert_eq!(machine.handle(DrawingEvent::PointerUp), DrawingOutcome::Unchanged);

		machine.handle(DrawingEvent::PointerDown(p(0.4, 0.2)));
		machine.handle(DrawingEvent::PointerMove(p(0.5, 0.1)));
		assert_eq!(machine.handle(DrawingEvent::PointerUp), DrawingOutcome::Unchanged);
		assert_eq!(machine.buffer(), &[p(0.1, 0.1), p(0.5, 0.1)]);

		machine.handle(DrawingEvent::PointerDown(p(0.3, 0.4)));
		let points = committed_points(machine.handle(DrawingEvent::PointerUp));
		assert_eq!(points, vec![p(0.1, 0.1), p(0.5, 0.1), p(0.3, 0.4)]);

		machine.handle(DrawingEvent::PointerDown(p(0.2, 0.6)));
		let points = committed_points(machine.handle(DrawingEvent::PointerUp));
		assert_eq!(points.len(), 4);
	}

	#[test]
	fn closing_polygon_starts_a_fresh_one() {
		let mut machine = DrawingStateMachine::new(ShapeKind::Polygon);
		for (x, y) in [(0.1, 0.1), (0.5, 0.1), (0.3, 0.4)] {
			machine.handle(DrawingEvent::PointerDown(p(x, y)));
			machine.handle(DrawingEvent::PointerUp);
		}
		let points = committed_points(machine.handle(DrawingEvent::ClosePolygon));
		assert_eq!(points.len(), 3);
		assert!(machine.buffer().is_empty());

		machine.handle(DrawingEvent::PointerDown(p(0.7, 0.7)));
		assert_eq!(machine.buffer(), &[p(0.7, 0.7)]);
	}

	#[test]
	fn closing_short_polygon_discards_it() {
		let mut machine = DrawingStateMachine::new(ShapeKind::Polygon);
		machine.handle(DrawingEvent::PointerDown(p(0.1, 0.1)));
		machine.handle(DrawingEvent::PointerUp);
		assert_eq!(machine.handle(DrawingEvent::ClosePolygon), DrawingOutcome::Unchanged);
		assert!(machine.buffer().is_empty());
	}

	#[test]
	fn type_change_and_reset_clear_everything() {
		let mut machine = DrawingStateMachine::new(ShapeKind::Line);
		machine.handle(DrawingEvent::PointerDown(p(0.3, 0.3)));
		machine.handle(DrawingEvent::PointerMove(p(0.6, 0.6)));

		assert_eq!(machine.handle(DrawingEvent::TypeChanged(ShapeKind::Polygon)), DrawingOutcome::Cleared);
		assert_eq!(machine.kind(), ShapeKind::Polygon);
		assert_eq!(machine.state(), DrawingState::Idle);
		assert!(machine.buffer().is_empty());

		machine.handle(DrawingEvent::PointerDown(p(0.3, 0.3)));
		assert_eq!(machine.handle(DrawingEvent::Reset), DrawingOutcome::Cleared);
		assert_eq!(machine.state(), DrawingState::Idle);
		assert!(machine.buffer().is_empty());
	}

	#[test]
	fn preview_overlay_follows_the_gesture() {
		let viewport = Viewport::new(200.0, 100.0).unwrap();
		let mut machine = DrawingStateMachine::new(ShapeKind::Rectangle);
		machine.handle(DrawingEvent::PointerDown(p(0.5, 0.5)));
		assert!(machine.preview_overlay(viewport).is_none());

		machine.handle(DrawingEvent::PointerMove(p(0.25, 0.25)));
		assert_eq!(
			machine.preview_overlay(viewport),
			Some(Overlay::Rect { x: 50.0, y: 25.0, width: 50.0, height: 25.0 })
		);
	}
}
