// 由上游鉴权层通过请求头传入的用户标识
pub type UserId = String;
// 测验记录ID
pub type QuizId = String;
// 准备连接的db文件
pub type SqlFile = String;
