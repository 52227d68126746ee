use std::time::{Duration, Instant};

/// How long a transient notice stays visible.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
	SelectTypeFirst,
	IncompleteRoi,
	SnapshotFailed,
	SaveFailed,
	StreamFailed,
}

impl NoticeKind {
	pub fn message(&self) -> &'static str {
		match self {
			NoticeKind::SelectTypeFirst => "Please select a type before drawing.",
			NoticeKind::IncompleteRoi => "ROI type and area must be specified",
			NoticeKind::SnapshotFailed => "no ROI image available",
			NoticeKind::SaveFailed => "Failed to save camera settings",
			NoticeKind::StreamFailed => "No Video Available",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
	pub kind: NoticeKind,
	pub raised_at: Instant,
}

impl Notice {
	pub fn is_visible_at(&self, now: Instant) -> bool {
		now.saturating_duration_since(self.raised_at) < NOTICE_DURATION
	}
}

/// Holds at most one notice; a newer one replaces the older.
#[derive(Debug, Default, Clone)]
pub struct NoticeSlot {
	current: Option<Notice>,
}

impl NoticeSlot {
	pub fn raise(&mut self, kind: NoticeKind, now: Instant) {
		self.current = Some(Notice { kind, raised_at: now });
	}

	/// The notice still on screen at `now`, if any. Expired notices are dropped.
	pub fn visible(&mut self, now: Instant) -> Option<Notice> {
		match self.current {
			Some(notice) if notice.is_visible_at(now) => Some(notice),
			_ => {
				self.current = None;
				None
			}
		}
	}

	pub fn clear(&mut self) {
		self.current = None;
	}
}
