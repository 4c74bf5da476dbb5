//! Query state read from, and written back to, the navigation surface.

use std::sync::{Arc, Mutex, MutexGuard};

use scout_domain::{
	Location, LocationRequest, PageSizes, Pager, QueryState, SortKey, corrected_offset,
	needs_correction, query,
};

use crate::{Error, Result};

/// The host's navigation surface.
pub trait Navigation
where
	Self: Send + Sync,
{
	fn current(&self) -> Location;

	fn navigate(&self, location: Location);
}

/// In-process navigation with a back-stack.
pub struct MemoryNavigation {
	stack: Mutex<Vec<Location>>,
}
impl MemoryNavigation {
	pub fn new(initial: Location) -> Self {
		Self { stack: Mutex::new(vec![initial]) }
	}

	pub fn parse(href: &str) -> Self {
		Self::new(Location::parse(href))
	}

	/// Pops the current location. Returns `false` when only the initial one is left.
	pub fn back(&self) -> bool {
		let mut stack = self.lock();

		if stack.len() <= 1 {
			return false;
		}

		stack.pop();

		true
	}

	/// Number of locations on the stack, the initial one included.
	pub fn depth(&self) -> usize {
		self.lock().len()
	}

	fn lock(&self) -> MutexGuard<'_, Vec<Location>> {
		self.stack.lock().unwrap_or_else(|err| err.into_inner())
	}
}

impl Navigation for MemoryNavigation {
	fn current(&self) -> Location {
		self.lock().last().cloned().unwrap_or_else(|| Location::new(scout_domain::ROOT_PATH))
	}

	fn navigate(&self, location: Location) {
		self.lock().push(location);
	}
}

/// A navigation computed against `basis`, valid only while the host still shows it.
struct Scheduled {
	basis: Location,
	request: LocationRequest,
}

pub struct Navigator {
	navigation: Arc<dyn Navigation>,
	page_sizes: PageSizes,
	scheduled: Mutex<Option<Scheduled>>,
}
impl Navigator {
	pub fn new(navigation: Arc<dyn Navigation>, page_sizes: PageSizes) -> Self {
		Self { navigation, page_sizes, scheduled: Mutex::new(None) }
	}

	pub fn page_sizes(&self) -> &PageSizes {
		&self.page_sizes
	}

	pub fn location(&self) -> Location {
		self.navigation.current()
	}

	/// The query encoded in the current location, offset as found. A misaligned offset schedules
	/// a corrective navigation that `flush` applies.
	pub fn query(&self) -> QueryState {
		let current = self.navigation.current();
		let state = QueryState::from_location(&current, &self.page_sizes);

		if needs_correction(state.offset, state.limit) {
			let corrected = corrected_offset(state.offset, state.limit);

			tracing::debug!(
				offset = state.offset,
				limit = state.limit,
				corrected,
				"Scheduled offset correction."
			);

			self.schedule(current, offset_request(corrected));
		}

		state
	}

	/// The scheduled navigation, if any.
	pub fn pending(&self) -> Option<LocationRequest> {
		self.lock_scheduled().as_ref().map(|scheduled| scheduled.request.clone())
	}

	/// Applies the scheduled navigation. Returns whether it was applied.
	///
	/// A navigation scheduled against a location the host has since left is dropped.
	pub fn flush(&self) -> bool {
		let Some(scheduled) = self.lock_scheduled().take() else {
			return false;
		};
		let current = self.navigation.current();

		if current != scheduled.basis {
			tracing::debug!(
				basis = %scheduled.basis.to_href(),
				current = %current.to_href(),
				"Dropped scheduled navigation computed against a stale location."
			);

			return false;
		}

		let next = current.merge(&scheduled.request);

		self.navigation.navigate(next);

		true
	}

	/// The href `request` would lead to, without navigating.
	pub fn href(&self, request: &LocationRequest) -> String {
		self.navigation.current().merge(request).to_href()
	}

	/// Navigates to `request` merged onto the current location. Anything scheduled against the
	/// old location is dropped.
	pub fn go(&self, request: &LocationRequest) -> Location {
		if self.lock_scheduled().take().is_some() {
			tracing::debug!("Dropped scheduled navigation superseded by a new one.");
		}

		let next = self.navigation.current().merge(request);

		self.navigation.navigate(next.clone());

		next
	}

	pub fn set_search_text(&self, text: &str) -> Location {
		self.apply(|state| {
			state.search_text = text.trim().to_string();
			state.offset = 0;
		})
	}

	/// Returns whether `value` is selected afterwards.
	pub fn toggle_facet(&self, facet: &str, value: &str) -> bool {
		let mut selected = false;

		self.apply(|state| {
			selected = state.toggle_facet(facet, value);
			state.offset = 0;
		});

		selected
	}

	pub fn clear_facet(&self, facet: &str) -> Location {
		self.apply(|state| {
			state.facets.remove(facet);
			state.offset = 0;
		})
	}

	pub fn set_sort(&self, sort: SortKey) -> Location {
		self.apply(|state| {
			state.sort = sort;
			state.offset = 0;
		})
	}

	/// Switches the page size, keeping the first visible item on the new page.
	pub fn set_limit(&self, limit: u64) -> Result<Location> {
		if !self.page_sizes.contains(limit) {
			return Err(Error::InvalidRequest {
				message: format!(
					"Page size {limit} is not one of {:?}.",
					self.page_sizes.allowed()
				),
			});
		}

		Ok(self.apply(|state| {
			state.limit = limit;

			if state.offset > 0 {
				state.offset = corrected_offset(state.offset, limit);
			}
		}))
	}

	pub fn first_page(&self) -> bool {
		self.move_page(0, |pager| pager.has_previous().then(|| pager.first()))
	}

	pub fn previous_page(&self) -> bool {
		self.move_page(0, |pager| pager.previous())
	}

	pub fn next_page(&self, total: u64) -> bool {
		self.move_page(total, |pager| pager.next())
	}

	pub fn last_page(&self, total: u64) -> bool {
		self.move_page(total, |pager| {
			let last = pager.last();

			(last != pager.offset).then_some(last)
		})
	}

	fn move_page<F>(&self, total: u64, target: F) -> bool
	where
		F: FnOnce(&Pager) -> Option<u64>,
	{
		let state = QueryState::from_location(&self.navigation.current(), &self.page_sizes);
		let pager = Pager::new(corrected_offset(state.offset, state.limit), state.limit, total);
		let Some(offset) = target(&pager) else {
			return false;
		};

		self.go(&offset_request(offset));

		true
	}

	fn apply<F>(&self, edit: F) -> Location
	where
		F: FnOnce(&mut QueryState),
	{
		let current = self.navigation.current();
		let mut state = QueryState::from_location(&current, &self.page_sizes);

		edit(&mut state);

		self.go(&state.to_request(&current, &self.page_sizes))
	}

	fn schedule(&self, basis: Location, request: LocationRequest) {
		let mut scheduled = self.lock_scheduled();

		match scheduled.as_mut() {
			Some(existing) if existing.basis == basis => existing.request.extend(request),
			_ => *scheduled = Some(Scheduled { basis, request }),
		}
	}

	fn lock_scheduled(&self) -> MutexGuard<'_, Option<Scheduled>> {
		self.scheduled.lock().unwrap_or_else(|err| err.into_inner())
	}
}

fn offset_request(offset: u64) -> LocationRequest {
	if offset == 0 {
		LocationRequest::new().delete(query::OFFSET_PARAM)
	} else {
		LocationRequest::new().set(query::OFFSET_PARAM, offset.to_string())
	}
}
