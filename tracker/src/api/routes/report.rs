use crate::api::extract::CurrentUser;
use crate::api::routes::budget::MonthQuery;
use crate::error::Result;
use crate::service::report::ReportService;
use actix_web::{get, web, HttpResponse};

#[get("/users/reports")]
async fn monthly_report(
    CurrentUser(user): CurrentUser,
    query: web::Query<MonthQuery>,
    reports: web::Data<ReportService>,
) -> Result<HttpResponse> {
    let report = reports.report(user.id, query.into_inner().month).await?;
    Ok(HttpResponse::Ok().json(report))
}
