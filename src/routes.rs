use crate::{
    api::{
        attendance, break_request, leave_request, notification, organization, salary,
        salary_history, users,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(handlers::protected)
            .service(
                web::scope("/users")
                    .service(
                        web::resource("")
                            .route(web::post().to(users::create_user))
                            .route(web::get().to(users::list_users)),
                    )
                    .service(
                        web::resource("/{user_id}")
                            .route(web::get().to(users::get_user))
                            .route(web::put().to(users::update_user))
                            .route(web::delete().to(users::delete_user)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    )
                    .service(web::resource("/manual").route(web::post().to(attendance::manual_mark)))
                    .service(
                        web::resource("/summary").route(web::get().to(attendance::monthly_summary)),
                    )
                    .service(
                        web::resource("/verify-network")
                            .route(web::post().to(attendance::verify_network)),
                    )
                    .service(
                        web::resource("/{record_id}")
                            .route(web::delete().to(attendance::delete_record)),
                    ),
            )
            .service(
                web::scope("/breaks")
                    .service(
                        web::resource("")
                            .route(web::post().to(break_request::create_break))
                            .route(web::get().to(break_request::list_breaks)),
                    )
                    .service(
                        web::resource("/{break_id}/approve")
                            .route(web::put().to(break_request::approve_break)),
                    )
                    .service(
                        web::resource("/{break_id}/reject")
                            .route(web::put().to(break_request::reject_break)),
                    )
                    .service(
                        web::resource("/{break_id}/cancel")
                            .route(web::put().to(break_request::cancel_break)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/{leave_id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave)),
                    )
                    .service(
                        web::resource("/{leave_id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    )
                    .service(
                        web::resource("/{leave_id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{leave_id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/salary")
                    .service(
                        web::resource("")
                            .route(web::post().to(salary::create_salary))
                            .route(web::get().to(salary::list_salaries)),
                    )
                    .service(
                        web::resource("/{salary_id}")
                            .route(web::get().to(salary::get_salary))
                            .route(web::put().to(salary::update_salary)),
                    )
                    .service(
                        web::resource("/{salary_id}/status")
                            .route(web::put().to(salary::transition_salary)),
                    ),
            )
            .service(
                web::scope("/salary-history")
                    .service(
                        web::resource("").route(web::post().to(salary_history::create_change)),
                    )
                    .service(
                        web::resource("/apply-pending")
                            .route(web::post().to(salary_history::apply_pending)),
                    )
                    .service(
                        web::resource("/{user_id}")
                            .route(web::get().to(salary_history::list_history)),
                    )
                    .service(
                        web::resource("/{user_id}/latest")
                            .route(web::get().to(salary_history::latest_entry)),
                    ),
            )
            .service(
                web::scope("/organizations")
                    .service(
                        web::resource("")
                            .route(web::post().to(organization::create_organization))
                            .route(web::get().to(organization::list_organizations)),
                    )
                    .service(
                        web::resource("/{org_id}")
                            .route(web::get().to(organization::get_organization)),
                    )
                    .service(
                        web::resource("/{org_id}/networks")
                            .route(web::post().to(organization::add_network))
                            .route(web::get().to(organization::list_networks)),
                    )
                    .service(
                        web::resource("/{org_id}/networks/{network_id}/deactivate")
                            .route(web::put().to(organization::deactivate_network)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("")
                            .route(web::post().to(notification::create_notification))
                            .route(web::get().to(notification::list_notifications)),
                    )
                    .service(
                        web::resource("/read-all")
                            .route(web::put().to(notification::mark_all_read)),
                    )
                    .service(
                        web::resource("/{notification_id}/read")
                            .route(web::put().to(notification::mark_read)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
