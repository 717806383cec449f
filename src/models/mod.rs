mod booking;
mod rating;
mod review;
mod user;
mod vendor;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use rating::{RatingDistribution, RatingSummary, round_half_up_ratio};
pub use review::{MAX_RATING, MIN_RATING, NewReview, REVIEW_EDIT_WINDOW, Review, ReviewChangeset};
pub use user::{NewUser, UpdateUser, User, UserRole};
pub use vendor::{NewVendor, Vendor, VendorCategory, VendorProfileChangeset};
