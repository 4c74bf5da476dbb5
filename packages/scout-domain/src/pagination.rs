/// Largest multiple of `limit` not above `offset`. A zero limit maps everything to the first page.
pub fn corrected_offset(offset: u64, limit: u64) -> u64 {
	if limit == 0 {
		return 0;
	}

	offset / limit * limit
}

pub fn needs_correction(offset: u64, limit: u64) -> bool {
	corrected_offset(offset, limit) != offset
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
	pub offset: u64,
	pub limit: u64,
	pub total: u64,
}
impl Pager {
	pub fn new(offset: u64, limit: u64, total: u64) -> Self {
		Self { offset, limit, total }
	}

	pub fn first(&self) -> u64 {
		0
	}

	/// `None` when already on the first page.
	pub fn previous(&self) -> Option<u64> {
		if self.offset == 0 {
			return None;
		}

		Some(self.offset.saturating_sub(self.limit))
	}

	/// `None` when the current page already reaches `total`.
	pub fn next(&self) -> Option<u64> {
		let next = self.offset.saturating_add(self.limit);

		(self.limit > 0 && next < self.total).then_some(next)
	}

	pub fn last(&self) -> u64 {
		if self.limit == 0 || self.total <= self.limit {
			return 0;
		}

		(self.total - self.limit).div_ceil(self.limit) * self.limit
	}

	pub fn page(&self) -> u64 {
		if self.limit == 0 {
			return 0;
		}

		self.offset / self.limit
	}

	pub fn page_count(&self) -> u64 {
		if self.limit == 0 {
			return 0;
		}

		self.total.div_ceil(self.limit)
	}

	pub fn has_previous(&self) -> bool {
		self.previous().is_some()
	}

	pub fn has_next(&self) -> bool {
		self.next().is_some()
	}
}
