mod args;
mod error;
mod functions;
mod state;
mod traits;
mod types;
mod validation;

pub use args::{
    PopupWindowFeatures, RedirectMethod, RedirectTarget, SigninPopupArgs, SigninRedirectArgs,
    SigninRequestArgs, SigninResourceOwnerCredentialsArgs, SigninSilentArgs, SignoutPopupArgs,
    SignoutRedirectArgs, SignoutRequestArgs, SignoutSilentArgs,
};
pub use error::{CoreError, ErrorContext, ErrorSource, ManagerError};
pub use functions::{reduce, reduce_all, AuthAction};
pub use state::{initial_auth_state, AuthState};
pub use traits::{Result, UserManager, UserManagerEvent};
pub use types::{ActiveNavigator, ErrorPolicy, NavigatorRequest, User, UserProfile};
pub use validation::{has_auth_params, matches_callback_url, ResponseMode};
