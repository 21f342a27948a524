use crate::{
    cli::{actions::output, globals::GlobalArgs},
    features::payments::{CheckoutState, PaymentMethod, ReturnParams, SubmitOutcome},
    routes::Route,
};
use anyhow::{bail, Result};

pub enum Args {
    Checkout {
        course_id: String,
        payment_method: PaymentMethod,
    },
    Return {
        url: String,
    },
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checkout { course_id, .. } => f
                .debug_struct("Checkout")
                .field("course_id", course_id)
                .finish_non_exhaustive(),
            Self::Return { .. } => f.debug_struct("Return").finish_non_exhaustive(),
        }
    }
}

/// # Errors
/// Returns checkout failures and processor declines.
pub async fn execute(globals: &GlobalArgs, args: Args) -> Result<()> {
    let app = globals.app()?;

    match args {
        Args::Checkout {
            course_id,
            payment_method,
        } => {
            app.bootstrap().await;
            let flow = app.checkout(&course_id);

            if let Some(route) = flow.begin().await {
                if let CheckoutState::Failed { message } = flow.state() {
                    output::next(&route);
                    bail!(message);
                }
                println!("{}", begin_message(&route, app.session.snapshot().is_admin()));
                output::next(&route);
                return Ok(());
            }

            match flow.submit(&payment_method).await? {
                SubmitOutcome::Redirect { url } => {
                    println!("Your bank needs to confirm this payment. Open:");
                    println!("  {url}");
                    println!("then run `coursehub payment-return <url>` with the page you land on.");
                }
                SubmitOutcome::Completed { route, notice } => {
                    output::message(notice, "Payment successful. You are enrolled.");
                    output::next(&route);
                }
            }
        }
        Args::Return { url } => {
            app.session.fetch_current_user().await;
            let params = ReturnParams::parse(&url)?;
            let outcome = app.payment_return().resume(&params).await;

            match outcome.state {
                CheckoutState::Succeeded { notice } => {
                    output::message(notice, "Payment successful. You are enrolled.");
                }
                CheckoutState::Failed { message } => bail!(message),
                other => println!("Payment state: {other:?}"),
            }
            if let Some(route) = &outcome.route {
                output::next(route);
            }
        }
    }

    Ok(())
}

/// What to tell the user when checkout ends before payment: guests log in,
/// admins already have access, and free courses were just enrolled.
fn begin_message(route: &Route, is_admin: bool) -> &'static str {
    match route {
        Route::Login => "Please log in to buy this course.",
        Route::Lectures(_) if is_admin => "You already have access to this course.",
        Route::Lectures(_) => "This course is free. You are now enrolled.",
        _ => "Checkout did not start.",
    }
}

#[cfg(test)]
mod tests {
    use super::begin_message;
    use crate::routes::Route;

    #[test]
    fn test_free_enrollment_is_reported_as_enrolled() {
        let lectures = Route::Lectures("c1".to_string());
        assert_eq!(
            begin_message(&lectures, false),
            "This course is free. You are now enrolled."
        );
        assert_eq!(
            begin_message(&lectures, true),
            "You already have access to this course."
        );
        assert_eq!(
            begin_message(&Route::Login, false),
            "Please log in to buy this course."
        );
    }
}
