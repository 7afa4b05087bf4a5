pub mod availability;
pub mod events;
pub mod pricing;
pub mod selector;
pub mod services;
pub mod state;

// Re-export key types for convenience
pub use availability::{blocked_dates, ensure_available, find_conflict, Conflict};
pub use events::{create_event_bus, Event, EventBus, EventMessage, EventSubscriber, SharedEventBus};
pub use pricing::{price, quote};
pub use selector::{CalendarDay, DateRangeSelector, DayState, MonthGrid, Selection};
pub use services::{
    authorize_transition, is_discoverable, BookingPolicy, CatalogService, ReservationService,
    ReviewService,
};
pub use state::MarketplaceState;
