//! Unified error codes for Mesa
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Reservation errors
//! - 4xxx: POS order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can switch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Setting key is not known
    UnknownSetting = 20,
    /// Setting value does not match the key's type
    InvalidSettingValue = 21,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Too many attempts from the same client
    TooManyRequests = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// An admin cannot demote or disable their own account
    CannotModifySelf = 2006,

    // ==================== 3xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 3001,
    /// Status change not allowed from the current status
    ReservationInvalidTransition = 3002,
    /// Reservation start is in the past
    ReservationInPast = 3003,
    /// Reservation falls outside opening hours
    ReservationOutsideHours = 3004,
    /// Reservation can no longer be edited
    ReservationNotEditable = 3005,
    /// Table already booked for an overlapping time
    TableAlreadyBooked = 3006,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order is not open
    OrderNotOpen = 4003,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Insufficient payment amount
    PaymentInsufficientAmount = 5002,
    /// Invalid payment method
    PaymentInvalidMethod = 5003,
    /// Payment not found
    PaymentNotFound = 5006,
    /// Already paid
    PaymentAlreadyPaid = 5007,
    /// Payment gateway rejected or failed the request
    PaymentGatewayError = 5008,
    /// Callback amount does not match the payment
    PaymentAmountMismatch = 5009,
    /// Online payments are disabled in settings
    PaymentsDisabled = 5010,
    /// Callback key does not match
    PaymentCallbackUnauthorized = 5011,
    /// Nothing to pay (zero total)
    NothingToPay = 5012,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item price is invalid
    MenuItemInvalidPrice = 6002,
    /// Menu item is not available
    MenuItemUnavailable = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category still has items
    CategoryHasItems = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table number already exists
    TableNumberExists = 7002,
    /// Table is not active
    TableInactive = 7003,
    /// Party size exceeds table capacity
    TableCapacityExceeded = 7004,
    /// Table has upcoming reservations
    TableHasReservations = 7005,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Email already exists
    EmailExists = 8003,
    /// Cannot delete own account
    CannotDeleteSelf = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Every defined code, in declaration order
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::ValueOutOfRange,
        ErrorCode::UnknownSetting,
        ErrorCode::InvalidSettingValue,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::AccountDisabled,
        ErrorCode::TooManyRequests,
        ErrorCode::PermissionDenied,
        ErrorCode::AdminRequired,
        ErrorCode::CannotModifySelf,
        ErrorCode::ReservationNotFound,
        ErrorCode::ReservationInvalidTransition,
        ErrorCode::ReservationInPast,
        ErrorCode::ReservationOutsideHours,
        ErrorCode::ReservationNotEditable,
        ErrorCode::TableAlreadyBooked,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderAlreadyPaid,
        ErrorCode::OrderNotOpen,
        ErrorCode::OrderItemNotFound,
        ErrorCode::OrderEmpty,
        ErrorCode::PaymentFailed,
        ErrorCode::PaymentInsufficientAmount,
        ErrorCode::PaymentInvalidMethod,
        ErrorCode::PaymentNotFound,
        ErrorCode::PaymentAlreadyPaid,
        ErrorCode::PaymentGatewayError,
        ErrorCode::PaymentAmountMismatch,
        ErrorCode::PaymentsDisabled,
        ErrorCode::PaymentCallbackUnauthorized,
        ErrorCode::NothingToPay,
        ErrorCode::MenuItemNotFound,
        ErrorCode::MenuItemInvalidPrice,
        ErrorCode::MenuItemUnavailable,
        ErrorCode::CategoryNotFound,
        ErrorCode::CategoryHasItems,
        ErrorCode::CategoryNameExists,
        ErrorCode::TableNotFound,
        ErrorCode::TableNumberExists,
        ErrorCode::TableInactive,
        ErrorCode::TableCapacityExceeded,
        ErrorCode::TableHasReservations,
        ErrorCode::UserNotFound,
        ErrorCode::UsernameExists,
        ErrorCode::EmailExists,
        ErrorCode::CannotDeleteSelf,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
    ];

    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::UnknownSetting => "Unknown setting key",
            ErrorCode::InvalidSettingValue => "Invalid setting value",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Session has expired",
            ErrorCode::TokenInvalid => "Session token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::CannotModifySelf => "Cannot demote or disable your own account",

            // Reservation
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationInvalidTransition => "Reservation status change not allowed",
            ErrorCode::ReservationInPast => "Reservation time is in the past",
            ErrorCode::ReservationOutsideHours => "Reservation is outside opening hours",
            ErrorCode::ReservationNotEditable => "Reservation can no longer be edited",
            ErrorCode::TableAlreadyBooked => "Table is already booked for this time",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderNotOpen => "Order is not open",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order has no items",

            // Payment
            ErrorCode::PaymentFailed => "Payment failed",
            ErrorCode::PaymentInsufficientAmount => "Insufficient payment amount",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::PaymentAlreadyPaid => "Already paid",
            ErrorCode::PaymentGatewayError => "Payment gateway error",
            ErrorCode::PaymentAmountMismatch => "Payment amount mismatch",
            ErrorCode::PaymentsDisabled => "Online payments are disabled",
            ErrorCode::PaymentCallbackUnauthorized => "Invalid payment callback key",
            ErrorCode::NothingToPay => "Nothing to pay",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Invalid menu item price",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasItems => "Category still has menu items",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNumberExists => "Table number already exists",
            ErrorCode::TableInactive => "Table is not active",
            ErrorCode::TableCapacityExceeded => "Party size exceeds table capacity",
            ErrorCode::TableHasReservations => "Table has upcoming reservations",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "Email already exists",
            ErrorCode::CannotDeleteSelf => "Cannot delete your own account",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::TableAlreadyBooked.code(), 3006);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4007);
        assert_eq!(ErrorCode::PaymentGatewayError.code(), 5008);
        assert_eq!(ErrorCode::CategoryHasItems.code(), 6102);
        assert_eq!(ErrorCode::TableNumberExists.code(), 7002);
        assert_eq!(ErrorCode::EmailExists.code(), 8003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_all_codes_are_unique_and_round_trip() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TableAlreadyBooked).unwrap();
        assert_eq!(json, "3006");
        let back: ErrorCode = serde_json::from_str("6102").unwrap();
        assert_eq!(back, ErrorCode::CategoryHasItems);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::NotFound), "3");
        assert_eq!(format!("{}", InvalidErrorCode(77)), "invalid error code: 77");
    }
}
