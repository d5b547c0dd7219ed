use log::debug;
use std::io;
use std::mem;
use std::net::{SocketAddrV4, TcpListener};
use std::os::fd::{FromRawFd, OwnedFd, RawFd};
use std::os::unix::io::AsRawFd;

/// Opens an IPv4 listening socket with an explicit `listen(2)` backlog.
pub fn bind(addr: SocketAddrV4, backlog: i32) -> io::Result<TcpListener> {
    let fd = cvt(unsafe { libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0) })?;
    // owned from here on so every early return closes it
    let socket = unsafe { OwnedFd::from_raw_fd(fd) };

    set_reuse_addr(socket.as_raw_fd())?;

    let sockaddr = to_sockaddr_in(addr);
    cvt(unsafe {
        libc::bind(
            socket.as_raw_fd(),
            &sockaddr as *const libc::sockaddr_in as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        )
    })?;

    cvt(unsafe { libc::listen(socket.as_raw_fd(), backlog) })?;

    let listener = TcpListener::from(socket);
    debug!(
        "Listening socket ready on {:?} (backlog {})",
        listener.local_addr().ok(),
        backlog
    );
    Ok(listener)
}

fn set_reuse_addr(fd: RawFd) -> io::Result<()> {
    let enable: libc::c_int = 1;
    cvt(unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &enable as *const libc::c_int as *const libc::c_void,
            mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    })?;
    Ok(())
}

fn to_sockaddr_in(addr: SocketAddrV4) -> libc::sockaddr_in {
    let mut sockaddr: libc::sockaddr_in = unsafe { mem::zeroed() };
    sockaddr.sin_family = libc::AF_INET as libc::sa_family_t;
    sockaddr.sin_port = addr.port().to_be();
    sockaddr.sin_addr = libc::in_addr {
        s_addr: u32::from(*addr.ip()).to_be(),
    };
    sockaddr
}

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}
